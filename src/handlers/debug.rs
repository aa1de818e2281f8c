use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::models::Accounts;
use crate::state::AppState;
use crate::store::{Document, FileInfo};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesReport {
    data_dir: String,
    data_dir_exists: bool,
    files: Vec<FileInfo>,
}

// GET /debug/files
pub async fn files(State(state): State<Arc<AppState>>) -> Json<FilesReport> {
    let dir = state.store.dir();
    Json(FilesReport {
        data_dir: dir.display().to_string(),
        data_dir_exists: dir.is_dir(),
        files: Document::ALL
            .iter()
            .map(|doc| state.store.file_info(*doc))
            .collect(),
    })
}

/// Replaces every access token with a length indicator.
pub fn mask_tokens(accounts: &Accounts) -> BTreeMap<String, Value> {
    accounts
        .iter()
        .map(|(id, record)| {
            let mut value = serde_json::to_value(record).unwrap_or(Value::Null);
            if let Some(obj) = value.as_object_mut() {
                obj.insert(
                    "access_token".to_string(),
                    Value::String(format!("<{} chars>", record.access_token.len())),
                );
            }
            (id.clone(), value)
        })
        .collect()
}

// GET /debug/read-accounts
pub async fn read_accounts(State(state): State<Arc<AppState>>) -> Json<Value> {
    let accounts = state.store.load_accounts();
    Json(serde_json::json!({
        "path": state.store.path(Document::Accounts).display().to_string(),
        "count": accounts.len(),
        "accounts": mask_tokens(&accounts),
    }))
}
