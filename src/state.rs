use axum::extract::FromRef;
use std::sync::Arc;

use crate::auth::{Authenticator, SessionStore, StaticCredentials};
use crate::catalog::{CourseCatalog, StaticCatalog};
use crate::config::Config;
use crate::db::Db;
use crate::storage::FileStore;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub files: FileStore,
    pub catalog: Arc<dyn CourseCatalog>,
    pub auth: Arc<dyn Authenticator>,
    pub sessions: SessionStore,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Db, config: Config) -> Self {
        Self {
            db,
            files: FileStore::new(&config.data_dir),
            catalog: Arc::new(StaticCatalog::seeded()),
            auth: Arc::new(StaticCredentials::new(
                config.lecturer_username.clone(),
                config.lecturer_password.clone(),
            )),
            sessions: SessionStore::new(config.session_ttl),
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for SessionStore {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}
