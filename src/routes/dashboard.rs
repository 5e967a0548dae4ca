use axum::extract::{Query, State};
use axum::Json;
use chrono::Datelike;
use serde::Deserialize;
use serde_with::{serde_as, NoneAsEmptyString};

use crate::auth::Lecturer;
use crate::catalog::{self, Dashboard};
use crate::state::AppState;

#[serde_as]
#[derive(Deserialize, Debug, Default)]
pub struct DashboardQuery {
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub year: Option<i64>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub trimester: Option<i64>,
}

pub async fn index(
    _lecturer: Lecturer,
    State(state): State<AppState>,
    Query(q): Query<DashboardQuery>,
) -> Json<Dashboard> {
    let now = chrono::Local::now();
    Json(catalog::dashboard(
        state.catalog.as_ref(),
        q.year,
        q.trimester,
        (now.year() as i64, now.month()),
    ))
}
