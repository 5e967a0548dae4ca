//! Spreadsheet layout for rubric uploads.
//!
//! Row 1 is the header: column 1 labels the criterion column, columns 2..=6
//! name the performance scale for scores 4, 3, 2, 1, 0. Every later row with
//! a non-blank first cell is one criterion; its columns 2..=6 are the level
//! descriptions. Rows with a blank first cell are skipped, and the scan runs
//! to the last populated row of the sheet.

use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::xlsx::{self, Sheet};

pub const HEADER_ROW: u32 = 1;
pub const FIRST_DATA_ROW: u32 = 2;
pub const FIRST_LEVEL_COL: u32 = 2;
pub const LAST_LEVEL_COL: u32 = 6;

pub const DEFAULT_SCALE_NAMES: [&str; 5] = [
    "Excellent",
    "Good",
    "Satisfactory",
    "Needs Improvement",
    "Unsatisfactory",
];

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LevelDraft {
    pub score: i64,
    pub scale_name: String,
    pub description: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CriterionDraft {
    pub name: String,
    pub levels: Vec<LevelDraft>,
}

/// A parsed rubric not yet written to the store.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RubricDraft {
    pub criteria: Vec<CriterionDraft>,
}

pub fn score_for_column(col: u32) -> i64 {
    6 - col as i64
}

pub fn parse_workbook(bytes: &[u8]) -> AppResult<RubricDraft> {
    let sheet = xlsx::read_first_sheet(bytes).map_err(|e| {
        tracing::warn!(target: "import", error = %e, "unreadable rubric workbook");
        AppError::validation("Invalid Excel file.")
    })?;
    parse_sheet(&sheet)
}

pub fn parse_sheet(sheet: &Sheet) -> AppResult<RubricDraft> {
    let scale_names: Vec<String> = (FIRST_LEVEL_COL..=LAST_LEVEL_COL)
        .map(|col| {
            let header = sheet.text(HEADER_ROW, col).trim();
            if header.is_empty() {
                DEFAULT_SCALE_NAMES[(col - FIRST_LEVEL_COL) as usize].to_string()
            } else {
                header.to_string()
            }
        })
        .collect();

    let mut criteria = Vec::new();
    for row in FIRST_DATA_ROW..=sheet.max_row() {
        let name = sheet.text(row, 1).trim();
        if name.is_empty() {
            continue;
        }
        let levels = (FIRST_LEVEL_COL..=LAST_LEVEL_COL)
            .map(|col| LevelDraft {
                score: score_for_column(col),
                scale_name: scale_names[(col - FIRST_LEVEL_COL) as usize].clone(),
                description: sheet.text(row, col).trim().to_string(),
            })
            .collect();
        criteria.push(CriterionDraft {
            name: name.to_string(),
            levels,
        });
    }

    if criteria.is_empty() {
        return Err(AppError::validation(
            "The spreadsheet contains no rubric criteria.",
        ));
    }
    tracing::debug!(target: "import", criteria = criteria.len(), "parsed rubric sheet");
    Ok(RubricDraft { criteria })
}
