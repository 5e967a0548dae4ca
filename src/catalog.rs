use serde::Serialize;
use std::collections::BTreeMap;

use crate::calendar;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CourseCard {
    pub code: String,
    pub title: String,
}

/// Read-only course lookup. Only decorates screens; nothing in the store
/// depends on it.
pub trait CourseCatalog: Send + Sync {
    /// Newest first.
    fn years(&self) -> Vec<i64>;
    fn trimesters_by_year(&self) -> BTreeMap<i64, Vec<i64>>;
    fn courses(&self, year: i64, trimester: i64) -> Vec<CourseCard>;

    fn course_title(&self, year: i64, trimester: i64, code: &str) -> Option<String> {
        self.courses(year, trimester)
            .into_iter()
            .find(|c| c.code == code)
            .map(|c| c.title)
    }
}

/// year -> trimester -> courses
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    data: BTreeMap<i64, BTreeMap<i64, Vec<CourseCard>>>,
}

impl StaticCatalog {
    pub fn new(data: BTreeMap<i64, BTreeMap<i64, Vec<CourseCard>>>) -> Self {
        Self { data }
    }

    /// Teaching data the service ships with until a real catalog is wired in.
    pub fn seeded() -> Self {
        let mut data = BTreeMap::new();
        data.insert(
            2026,
            BTreeMap::from([
                (
                    1,
                    cards(&[
                        ("INFO712", "Management Information Systems"),
                        ("SOFT703", "Web Applications Development"),
                        ("COMP720", "Information Technology Project"),
                    ]),
                ),
                (
                    2,
                    cards(&[
                        ("COMP701", "Software Engineering"),
                        ("COMP703", "Web App Dev (ASP.NET)"),
                    ]),
                ),
                (3, Vec::new()),
            ]),
        );
        data.insert(
            2025,
            BTreeMap::from([
                (
                    1,
                    cards(&[
                        ("COMP610", "Database Systems"),
                        ("COMP611", "Systems Analysis"),
                    ]),
                ),
                (2, Vec::new()),
                (3, Vec::new()),
            ]),
        );
        data.insert(
            2024,
            BTreeMap::from([
                (1, Vec::new()),
                (2, cards(&[("INFO600", "Intro to IT")])),
                (3, Vec::new()),
            ]),
        );
        Self { data }
    }
}

fn cards(items: &[(&str, &str)]) -> Vec<CourseCard> {
    items
        .iter()
        .map(|(code, title)| CourseCard {
            code: (*code).to_string(),
            title: (*title).to_string(),
        })
        .collect()
}

impl CourseCatalog for StaticCatalog {
    fn years(&self) -> Vec<i64> {
        self.data.keys().rev().copied().collect()
    }

    fn trimesters_by_year(&self) -> BTreeMap<i64, Vec<i64>> {
        self.data
            .iter()
            .map(|(y, tris)| (*y, tris.keys().copied().collect()))
            .collect()
    }

    fn courses(&self, year: i64, trimester: i64) -> Vec<CourseCard> {
        self.data
            .get(&year)
            .and_then(|tris| tris.get(&trimester))
            .cloned()
            .unwrap_or_default()
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct Dashboard {
    pub selected_year: i64,
    pub selected_trimester: i64,
    pub years: Vec<i64>,
    pub trimesters_by_year: BTreeMap<i64, Vec<i64>>,
    pub courses: Vec<CourseCard>,
    pub context_label: String,
}

/// Resolves the dashboard for a requested (or defaulted) teaching period.
/// A year the catalog does not know becomes the newest year; a trimester
/// not offered that year becomes the first one that is.
pub fn dashboard(
    catalog: &dyn CourseCatalog,
    year: Option<i64>,
    trimester: Option<i64>,
    today: (i64, u32),
) -> Dashboard {
    let (this_year, this_month) = today;
    let years = catalog.years();
    let trimesters_by_year = catalog.trimesters_by_year();

    let mut selected_year = year.unwrap_or(this_year);
    if !years.contains(&selected_year) {
        if let Some(newest) = years.first() {
            selected_year = *newest;
        }
    }

    let mut selected_trimester =
        trimester.unwrap_or_else(|| calendar::trimester_from_month(this_month));
    if let Some(available) = trimesters_by_year.get(&selected_year) {
        if !available.contains(&selected_trimester) {
            if let Some(first) = available.first() {
                selected_trimester = *first;
            }
        }
    }

    Dashboard {
        selected_year,
        selected_trimester,
        courses: catalog.courses(selected_year, selected_trimester),
        context_label: calendar::context_label(selected_year, selected_trimester),
        years,
        trimesters_by_year,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn years_newest_first() {
        assert_eq!(StaticCatalog::seeded().years(), vec![2026, 2025, 2024]);
    }

    #[test]
    fn unknown_year_falls_back_to_newest() {
        let cat = StaticCatalog::seeded();
        let d = dashboard(&cat, Some(1999), Some(2), (2026, 10));
        assert_eq!(d.selected_year, 2026);
        assert_eq!(d.selected_trimester, 2);
        assert_eq!(d.courses.len(), 2);
        assert_eq!(d.context_label, "2026 - Trimester 2");
    }

    #[test]
    fn defaults_come_from_today() {
        let cat = StaticCatalog::seeded();
        let d = dashboard(&cat, None, None, (2025, 2));
        assert_eq!((d.selected_year, d.selected_trimester), (2025, 1));
        assert_eq!(d.courses[0].code, "COMP610");
    }

    #[test]
    fn unknown_trimester_falls_back_to_first() {
        let mut data = BTreeMap::new();
        data.insert(2030, BTreeMap::from([(2, cards(&[("X100", "X")]))]));
        let cat = StaticCatalog::new(data);
        let d = dashboard(&cat, Some(2030), Some(3), (2030, 1));
        assert_eq!(d.selected_trimester, 2);
    }

    #[test]
    fn title_lookup() {
        let cat = StaticCatalog::seeded();
        assert_eq!(
            cat.course_title(2026, 1, "SOFT703").as_deref(),
            Some("Web Applications Development")
        );
        assert_eq!(cat.course_title(2026, 3, "SOFT703"), None);
    }
}
