use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Assignment {
    pub id: i64,
    pub course_code: String,
    pub assessment_name: String,
    pub year: i64,
    pub trimester: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct AssignmentFile {
    pub id: i64,
    pub assignment_id: i64,
    pub original_file_name: String,
    pub stored_file_name: String,
    pub file_path: String, // public URL under /uploads
    pub version_number: i64,
    pub upload_date: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LearningOutcome {
    pub id: i64,
    pub course_code: String,
    pub outcome_text: String,
    pub order_number: i64,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Rubric {
    pub id: i64,
    pub assignment_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct RubricCriterion {
    pub id: i64,
    pub rubric_id: i64,
    pub position: i64,
    pub criterion_name: String,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct RubricLevel {
    pub id: i64,
    pub criterion_id: i64,
    pub score: i64,
    pub scale_name: String,
    pub description: String,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct CriterionLoMapping {
    pub id: i64,
    pub criterion_id: i64,
    pub learning_outcome_id: i64,
    pub weight: f64, // marks, not percentage
}

// --- read models ---

#[derive(Serialize, Debug, Clone)]
pub struct CriterionView {
    #[serde(flatten)]
    pub criterion: RubricCriterion,
    /// Ordered by score, highest first.
    pub levels: Vec<RubricLevel>,
    pub mappings: Vec<CriterionLoMapping>,
}

#[derive(Serialize, Debug, Clone)]
pub struct RubricView {
    #[serde(flatten)]
    pub rubric: Rubric,
    pub criteria: Vec<CriterionView>,
}

#[derive(Serialize, Debug, Clone)]
pub struct AssignmentInfo {
    pub assignment: Assignment,
    pub files: Vec<AssignmentFile>,
    pub course_title: String,
    pub course_date: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct MappingScreen {
    pub assignment_id: i64,
    pub rubric: RubricView,
    pub learning_outcomes: Vec<LearningOutcome>,
    pub selected_lo_ids: Vec<i64>,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingSaveReport {
    pub rows_inserted: usize,
    pub tuples_dropped: usize,
    pub outcome_ids_dropped: usize,
}

// --- requests ---

/// Course/assignment context carried through query strings.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CourseContext {
    pub course_code: String,
    pub assessment_name: String,
    #[serde(default)]
    pub course_title: Option<String>,
    pub year: i64,
    pub trimester: i64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct MappingInput {
    pub criterion_id: i64,
    pub weight: f64,
    #[serde(default)]
    pub selected_lo_ids: Vec<i64>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct SaveMappingsReq {
    #[serde(default)]
    pub mappings: Vec<MappingInput>,
    #[serde(default)]
    pub selected_lo_ids: Vec<i64>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct LevelEdit {
    pub id: i64,
    pub score: Option<i64>,
    pub scale_name: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct CriterionEdit {
    pub id: i64,
    pub criterion_name: Option<String>,
    #[serde(default)]
    pub levels: Vec<LevelEdit>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct RubricEdit {
    #[serde(default)]
    pub criteria: Vec<CriterionEdit>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SaveOutcomesReq {
    #[serde(default)]
    pub outcomes: Vec<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct LoginReq {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}
