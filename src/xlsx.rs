//! Just enough OOXML to read the first worksheet of an `.xlsx` upload as
//! text cells.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("not a readable xlsx archive")]
    Archive,
    #[error("workbook has no worksheet")]
    MissingWorksheet,
    #[error("failed to parse worksheet xml")]
    Parse,
}

/// Cell text keyed by 1-based (row, column).
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    cells: BTreeMap<(u32, u32), String>,
}

impl Sheet {
    pub fn text(&self, row: u32, col: u32) -> &str {
        self.cells.get(&(row, col)).map(|s| s.as_str()).unwrap_or("")
    }

    pub fn max_row(&self) -> u32 {
        self.cells.keys().map(|(r, _)| *r).max().unwrap_or(0)
    }
}

pub fn read_first_sheet(bytes: &[u8]) -> Result<Sheet, SheetError> {
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|_| SheetError::Archive)?;

    let sheet_path = first_sheet_path(&mut zip).unwrap_or_else(|| "xl/worksheets/sheet1.xml".into());
    let shared = match read_entry(&mut zip, "xl/sharedStrings.xml") {
        Some(xml) => parse_shared_strings(&xml)?,
        None => Vec::new(),
    };
    let xml = read_entry(&mut zip, &sheet_path).ok_or(SheetError::MissingWorksheet)?;
    parse_sheet(&xml, &shared)
}

fn read_entry(zip: &mut zip::ZipArchive<Cursor<&[u8]>>, name: &str) -> Option<String> {
    let mut file = zip.by_name(name).ok()?;
    let mut out = String::new();
    file.read_to_string(&mut out).ok()?;
    Some(out)
}

/// Follows workbook.xml's first `<sheet r:id>` through the workbook rels.
fn first_sheet_path(zip: &mut zip::ZipArchive<Cursor<&[u8]>>) -> Option<String> {
    let workbook = read_entry(zip, "xl/workbook.xml")?;
    let rel_id = first_attr_of(&workbook, "sheet", "id")?;
    let rels = read_entry(zip, "xl/_rels/workbook.xml.rels")?;

    let mut reader = Reader::from_str(&rels);
    reader.trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if local_name(&e) == "Relationship" => {
                if get_attr(&e, "Id").as_deref() == Some(rel_id.as_str()) {
                    let target = get_attr(&e, "Target")?;
                    return Some(match target.strip_prefix('/') {
                        Some(abs) => abs.to_string(),
                        None => format!("xl/{}", target),
                    });
                }
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
        buf.clear();
    }
}

fn first_attr_of(xml: &str, element: &str, attr: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if local_name(&e) == element => {
                return get_attr(&e, attr);
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
        buf.clear();
    }
}

fn parse_shared_strings(xml: &str) -> Result<Vec<String>, SheetError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut out = Vec::new();
    let mut current: Option<String> = None;
    let mut in_t = false;
    // phonetic runs repeat the text in another script
    let mut in_phonetic = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match local_name(&e).as_str() {
                "si" => current = Some(String::new()),
                "t" => in_t = true,
                "rPh" => in_phonetic = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if local_name(&e) == "si" {
                    out.push(String::new());
                }
            }
            Ok(Event::Text(t)) => {
                if in_t && !in_phonetic {
                    if let Some(s) = current.as_mut() {
                        s.push_str(&t.unescape().map_err(|_| SheetError::Parse)?);
                    }
                }
            }
            Ok(Event::End(e)) => match end_name(e.name().as_ref()).as_str() {
                "si" => out.push(current.take().unwrap_or_default()),
                "t" => in_t = false,
                "rPh" => in_phonetic = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(_) => return Err(SheetError::Parse),
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}

#[derive(Default)]
struct PendingCell {
    at: (u32, u32),
    kind: Option<String>,
    value: String,
}

fn parse_sheet(xml: &str, shared: &[String]) -> Result<Sheet, SheetError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut sheet = Sheet::default();

    let mut row = 0u32;
    let mut col = 0u32;
    let mut cell: Option<PendingCell> = None;
    // text is only collected inside <v> or an inline string's <t>
    let mut collecting = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match local_name(&e).as_str() {
                "row" => {
                    row = get_attr(&e, "r").and_then(|r| r.parse().ok()).unwrap_or(row + 1);
                    col = 0;
                }
                "c" => {
                    let at = cell_position(&e, row, col);
                    col = at.1;
                    cell = Some(PendingCell {
                        at,
                        kind: get_attr(&e, "t"),
                        value: String::new(),
                    });
                }
                "v" | "t" => collecting = cell.is_some(),
                _ => {}
            },
            Ok(Event::Empty(e)) => match local_name(&e).as_str() {
                "row" => {
                    row = get_attr(&e, "r").and_then(|r| r.parse().ok()).unwrap_or(row + 1);
                    col = 0;
                }
                "c" => col = cell_position(&e, row, col).1,
                _ => {}
            },
            Ok(Event::Text(t)) => {
                if collecting {
                    if let Some(c) = cell.as_mut() {
                        c.value.push_str(&t.unescape().map_err(|_| SheetError::Parse)?);
                    }
                }
            }
            Ok(Event::End(e)) => match end_name(e.name().as_ref()).as_str() {
                "v" | "t" => collecting = false,
                "c" => {
                    if let Some(c) = cell.take() {
                        let text = resolve_cell(c.kind.as_deref(), c.value, shared);
                        if !text.is_empty() {
                            sheet.cells.insert(c.at, text);
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(_) => return Err(SheetError::Parse),
            _ => {}
        }
        buf.clear();
    }
    Ok(sheet)
}

fn resolve_cell(kind: Option<&str>, raw: String, shared: &[String]) -> String {
    match kind {
        Some("s") => raw
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|i| shared.get(i).cloned())
            .unwrap_or_default(),
        Some("b") => match raw.trim() {
            "1" => "TRUE".into(),
            _ => "FALSE".into(),
        },
        _ => raw,
    }
}

/// Position from an `r="C7"` reference, or the next column in the row.
fn cell_position(e: &BytesStart<'_>, row: u32, prev_col: u32) -> (u32, u32) {
    get_attr(e, "r")
        .and_then(|r| parse_ref(&r))
        .unwrap_or((row, prev_col + 1))
}

pub(crate) fn parse_ref(r: &str) -> Option<(u32, u32)> {
    let split = r.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = r.split_at(split);
    if letters.is_empty() {
        return None;
    }
    let mut col = 0u32;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        col = col * 26 + (ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    let row = digits.parse().ok()?;
    Some((row, col))
}

// ------------- helpers -------------

fn local_name(tag: &BytesStart<'_>) -> String {
    end_name(tag.name().as_ref())
}

fn end_name(raw: &[u8]) -> String {
    let full = String::from_utf8_lossy(raw).to_string();
    full.split(':').last().unwrap_or(&full).to_string()
}

fn get_attr(e: &BytesStart<'_>, key_local: &str) -> Option<String> {
    for a in e.attributes().flatten() {
        let key = std::str::from_utf8(a.key.as_ref()).unwrap_or_default();
        let key = key.split(':').last().unwrap_or(key);
        if key == key_local {
            return Some(a.unescape_value().ok()?.into_owned());
        }
    }
    None
}
