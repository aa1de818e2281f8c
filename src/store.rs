//! Flat-file JSON persistence.
//!
//! Each document is read and rewritten whole. Reads fall back to an empty
//! default and writes never report failure to the caller; both log instead.
//! There is no locking, so concurrent writers race and the last one wins.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::Accounts;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Document {
    Accounts,
    Schedule,
}

impl Document {
    pub const ALL: [Document; 2] = [Document::Accounts, Document::Schedule];

    pub fn file_name(&self) -> &'static str {
        match self {
            Document::Accounts => "accounts.json",
            Document::Schedule => "schedule.json",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub name: &'static str,
    pub path: String,
    pub exists: bool,
    pub size_bytes: Option<u64>,
    pub modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, doc: Document) -> PathBuf {
        self.dir.join(doc.file_name())
    }

    pub fn load<T: DeserializeOwned + Default>(&self, doc: Document) -> T {
        let path = self.path(doc);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return T::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read document");
                return T::default();
            }
        };

        if raw.trim().is_empty() {
            return T::default();
        }

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "failed to parse document, using default");
            T::default()
        })
    }

    pub fn save<T: Serialize>(&self, doc: Document, value: &T) {
        let path = self.path(doc);
        if let Err(e) = self.write_atomic(&path, value) {
            tracing::error!(path = %path.display(), error = %e, "failed to save document");
        }
    }

    fn write_atomic<T: Serialize>(&self, path: &Path, value: &T) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(value)?;
        // Unique temp name so two writers never share a half-written file.
        let tmp = self
            .dir
            .join(format!(".{}.{}.tmp", path_file_name(path), uuid::Uuid::new_v4()));
        fs::write(&tmp, json)?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    pub fn load_accounts(&self) -> Accounts {
        self.load(Document::Accounts)
    }

    pub fn save_accounts(&self, accounts: &Accounts) {
        self.save(Document::Accounts, accounts)
    }

    pub fn load_schedule(&self) -> Vec<String> {
        self.load(Document::Schedule)
    }

    pub fn save_schedule(&self, times: &[String]) {
        self.save(Document::Schedule, &times)
    }

    pub fn file_info(&self, doc: Document) -> FileInfo {
        let path = self.path(doc);
        let meta = fs::metadata(&path).ok();
        FileInfo {
            name: doc.file_name(),
            path: path.display().to_string(),
            exists: meta.is_some(),
            size_bytes: meta.as_ref().map(|m| m.len()),
            modified: meta
                .and_then(|m| m.modified().ok())
                .map(DateTime::<Utc>::from),
        }
    }
}

fn path_file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
