use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Characters escaped when a stored name is turned into a URL path segment.
const SEGMENT: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'#').add(b'%').add(b'/').add(b'?');

pub const OUTLINES: &str = "outlines";
pub const ASSIGNMENTS: &str = "assignments";

#[derive(Serialize, Debug, Clone)]
pub struct StoredFile {
    pub stored_name: String,
    pub url: String,
}

/// Durable file store rooted at `DATA_DIR/uploads`, served at `/uploads`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            root: data_dir.as_ref().join("uploads"),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn save(&self, category: &str, name: &str, bytes: &[u8]) -> AppResult<StoredFile> {
        check_name(name)?;
        let dir = self.root.join(category);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(name), bytes).await?;
        Ok(StoredFile {
            stored_name: name.to_string(),
            url: url_for(category, name),
        })
    }

    /// Deletes a stored file. A file that is already gone is not an error.
    pub async fn remove(&self, category: &str, name: &str) -> AppResult<()> {
        check_name(name)?;
        match tokio::fs::remove_file(self.root.join(category).join(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn url_if_exists(&self, category: &str, name: &str) -> Option<String> {
        check_name(name).ok()?;
        match tokio::fs::metadata(self.root.join(category).join(name)).await {
            Ok(m) if m.is_file() => Some(url_for(category, name)),
            _ => None,
        }
    }
}

pub fn url_for(category: &str, name: &str) -> String {
    format!("/uploads/{}/{}", category, utf8_percent_encode(name, SEGMENT))
}

/// Random collision-free name for an uploaded PDF.
pub fn random_pdf_name() -> String {
    format!("{}.pdf", Uuid::new_v4())
}

pub fn outline_file_name(course_code: &str, year: i64, trimester: i64) -> String {
    format!("{}-{}-T{}.pdf", course_code, year, trimester)
}

/// Case-insensitive extension check on a client-supplied file name.
pub fn has_extension(file_name: &str, ext: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

fn check_name(name: &str) -> AppResult<()> {
    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        return Err(AppError::validation("invalid file name"));
    }
    Ok(())
}
