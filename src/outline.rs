//! Best-effort learning-outcome extraction from course outline PDFs.
//!
//! Nothing here is allowed to fail the caller: every problem degrades to an
//! empty list and a `warn` on the `extraction` target so extraction quality
//! can be tracked separately from real errors.

use regex::Regex;
use std::sync::OnceLock;

pub const MIN_OUTCOME_LEN: usize = 20;

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*(?:\d+(?:\.\d+)*\.?\s+)?(?:course\s+|student\s+)?learning\s+outcomes?\b\s*:?")
            .expect("heading pattern")
    })
}

fn section_end_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^\s*(?:\d+(?:\.\d+)*\.?\s+)?(?:course\s+)?(?:assessments?|indicative\s+content|content|teaching|learning\s+and\s+teaching|resources|prerequisites?)(?:\s+[\w&-]+){0,2}\s*:?\s*$",
        )
        .expect("section pattern")
    })
}

fn item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(\d{1,2})[.)]\s+(.+)$").expect("item pattern"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern"))
}

const MAX_HEADING_WORDS: usize = 5;
const MINOR_WORDS: [&str; 7] = ["and", "of", "the", "for", "to", "in", "&"];

/// A short title-cased line with no sentence punctuation, e.g. "Marking
/// Scheme". Wrapped outcome text starts lower-case or ends in a full stop.
fn is_heading_like(line: &str) -> bool {
    let trimmed = line.trim().trim_end_matches(':');
    if trimmed.is_empty() || trimmed.ends_with(['.', ',', ';', ')']) {
        return false;
    }
    let words: Vec<&str> = trimmed.split_whitespace().collect();
    if words.len() > MAX_HEADING_WORDS {
        return false;
    }
    let starts_upper = |w: &str| w.chars().next().map_or(false, |c| c.is_uppercase());
    starts_upper(words[0])
        && words.iter().all(|w| {
            starts_upper(w)
                || MINOR_WORDS.contains(w)
                || w.chars().next().map_or(false, |c| c.is_ascii_digit())
        })
}

fn ends_section(line: &str) -> bool {
    section_end_re().is_match(line) || heading_re().is_match(line) || is_heading_like(line)
}

/// Pulls the numbered items out of the first "Learning Outcomes" section of
/// plain text. Output is a suggestion only.
pub fn extract_outcomes(text: &str) -> Vec<String> {
    let mut lines = text.lines();
    if !lines.any(|l| heading_re().is_match(l)) {
        return Vec::new();
    }

    let mut items: Vec<String> = Vec::new();
    let mut current: Option<String> = None;
    for line in lines {
        if ends_section(line) {
            break;
        }
        if let Some(caps) = item_re().captures(line) {
            if let Some(done) = current.take() {
                items.push(done);
            }
            current = Some(caps[2].to_string());
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            // a blank line closes the item being built
            if let Some(done) = current.take() {
                items.push(done);
            }
        } else if let Some(item) = current.as_mut() {
            item.push(' ');
            item.push_str(trimmed);
        }
    }
    if let Some(done) = current.take() {
        items.push(done);
    }

    let mut out: Vec<String> = Vec::new();
    for item in items {
        let norm = whitespace_re().replace_all(item.trim(), " ").into_owned();
        if norm.chars().count() < MIN_OUTCOME_LEN || out.contains(&norm) {
            continue;
        }
        out.push(norm);
    }
    out
}

/// Text extraction runs on a blocking thread; parser errors and panics both
/// come back as an empty list.
pub async fn extract_outcomes_from_pdf(bytes: Vec<u8>) -> Vec<String> {
    let size = bytes.len();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)).await;
    let text = match text {
        Ok(Ok(t)) => t,
        Ok(Err(e)) => {
            tracing::warn!(target: "extraction", size, error = ?e, "pdf text extraction failed");
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(target: "extraction", size, error = %e, "pdf text extraction aborted");
            return Vec::new();
        }
    };

    let outcomes = extract_outcomes(&text);
    if outcomes.is_empty() {
        tracing::warn!(target: "extraction", size, "no learning outcomes section recognised");
    } else {
        tracing::info!(target: "extraction", size, count = outcomes.len(), "learning outcomes extracted");
    }
    outcomes
}
