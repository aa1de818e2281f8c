use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::state::AppState;

// GET /buckets
pub async fn get_buckets(State(state): State<Arc<AppState>>) -> Json<BTreeMap<String, Vec<Value>>> {
    let buckets = state
        .store
        .load_accounts()
        .into_iter()
        .map(|(id, record)| (id, record.buckets))
        .collect();
    Json(buckets)
}

// POST /buckets
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBuckets {
    pub account_id: String,
    pub buckets: Vec<Value>,
}

pub async fn update_buckets(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateBuckets>,
) -> Result<Json<Value>, AppError> {
    let mut accounts = state.store.load_accounts();
    let record = accounts.get_mut(&payload.account_id).ok_or_else(|| {
        tracing::warn!(account_id = %payload.account_id, "bucket update for unknown account");
        AppError::NotFound(format!("account {}", payload.account_id))
    })?;

    record.buckets = payload.buckets;
    let count = record.buckets.len();
    state.store.save_accounts(&accounts);

    tracing::info!(account_id = %payload.account_id, count, "buckets updated");
    Ok(Json(serde_json::json!({
        "ok": true,
        "accountId": payload.account_id,
        "buckets": accounts[&payload.account_id].buckets,
    })))
}
