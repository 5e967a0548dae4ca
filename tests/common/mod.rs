#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use std::io::{Cursor, Write};
use tower::ServiceExt;

use loars::config::Config;
use loars::db::{self, Db};
use loars::models::Assignment;
use loars::rubric_import::{self, RubricDraft};
use loars::state::AppState;
use loars::store::assignments;

pub async fn test_db() -> Db {
    let db = db::connect("sqlite::memory:").await.expect("connect");
    db::migrate(&db).await.expect("migrate");
    db
}

pub async fn test_app() -> (Router, AppState, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = AppState::new(test_db().await, Config::for_data_dir(dir.path()));
    (loars::routes::app(state.clone()), state, dir)
}

pub async fn assignment(db: &Db, course_code: &str, name: &str) -> Assignment {
    assignments::find_or_create(db, course_code, name, 2026, 1)
        .await
        .expect("assignment")
}

pub async fn count(db: &Db, sql: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(sql)
        .fetch_one(db)
        .await
        .expect("count query")
}

/// Worksheet with one row per slice, cells as inline strings, wired up
/// through workbook.xml and its rels like a real export.
pub fn xlsx(rows: &[&[&str]]) -> Vec<u8> {
    let mut sheet = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (r, cells) in rows.iter().enumerate() {
        sheet.push_str(&format!("<row r=\"{}\">", r + 1));
        for (c, text) in cells.iter().enumerate() {
            if text.is_empty() {
                continue;
            }
            let col = (b'A' + c as u8) as char;
            sheet.push_str(&format!(
                "<c r=\"{}{}\" t=\"inlineStr\"><is><t>{}</t></is></c>",
                col,
                r + 1,
                text
            ));
        }
        sheet.push_str("</row>");
    }
    sheet.push_str("</sheetData></worksheet>");

    let workbook = r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#;
    let rels = r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

    let mut w = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in [
        ("xl/workbook.xml", workbook),
        ("xl/_rels/workbook.xml.rels", rels),
        ("xl/worksheets/sheet1.xml", sheet.as_str()),
    ] {
        w.start_file(name, zip::write::FileOptions::default())
            .expect("start entry");
        w.write_all(body.as_bytes()).expect("write entry");
    }
    w.finish().expect("finish zip").into_inner()
}

pub const HEADER: &[&str] = &[
    "Criteria",
    "Excellent",
    "Good",
    "Satisfactory",
    "Needs Improvement",
    "Unsatisfactory",
];

/// Header plus one criterion row per name, descriptions derived from it.
pub fn rubric_xlsx(names: &[&str]) -> Vec<u8> {
    let rows: Vec<Vec<String>> = names
        .iter()
        .map(|n| {
            let mut row = vec![n.to_string()];
            for score in [4, 3, 2, 1, 0] {
                row.push(format!("{} level {}", n, score));
            }
            row
        })
        .collect();
    let mut slices: Vec<Vec<&str>> = vec![HEADER.to_vec()];
    for r in &rows {
        slices.push(r.iter().map(|s| s.as_str()).collect());
    }
    let refs: Vec<&[&str]> = slices.iter().map(|r| r.as_slice()).collect();
    xlsx(&refs)
}

pub fn rubric_draft(names: &[&str]) -> RubricDraft {
    rubric_import::parse_workbook(&rubric_xlsx(names)).expect("draft")
}

/// Single-page PDF whose text stream draws each line 24pt below the last,
/// in the standard Helvetica font.
pub fn pdf(lines: &[&str]) -> Vec<u8> {
    let mut content = String::from("BT\n/F1 12 Tf\n72 720 Td\n");
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            content.push_str("0 -24 Td\n");
        }
        let escaped = line.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)");
        content.push_str(&format!("({}) Tj\n", escaped));
    }
    content.push_str("ET\n");

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>".to_string(),
        format!("<< /Length {} >>\nstream\n{}endstream", content.len(), content),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_string(),
    ];

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::new();
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }
    let xref = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for off in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", off).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref
        )
        .as_bytes(),
    );
    out
}

// --- http ---

pub const BOUNDARY: &str = "loars-test-boundary";

pub fn multipart_file(file_name: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            b = BOUNDARY,
            f = file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>, Option<String>) {
    let resp = app.clone().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body")
        .to_vec();
    (status, body, cookie)
}

pub fn json_body(bytes: &[u8]) -> serde_json::Value {
    serde_json::from_slice(bytes).expect("json body")
}

/// Logs in with the demo credentials and returns the `Cookie` header value.
pub async fn login(app: &Router) -> String {
    let req = Request::builder()
        .method("POST")
        .uri("/api/account/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"username":"lecturer","password":"Password@123"}"#,
        ))
        .expect("request");
    let (status, _, cookie) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    let cookie = cookie.expect("set-cookie");
    cookie.split(';').next().expect("cookie pair").to_string()
}

pub fn get(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .expect("request")
}

pub fn upload(uri: &str, cookie: &str, file_name: &str, bytes: &[u8]) -> Request<Body> {
    let (content_type, body) = multipart_file(file_name, bytes);
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .expect("request")
}

pub fn put_json(uri: &str, cookie: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}
