use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::models::PageInfo;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    id: String,
    display_name: String,
    page_info: Option<PageInfo>,
}

// GET /accounts
pub async fn list_accounts(State(state): State<Arc<AppState>>) -> Json<Vec<AccountSummary>> {
    let accounts = state.store.load_accounts();
    let summaries = accounts
        .into_iter()
        .map(|(id, record)| AccountSummary {
            page_info: record.page_info(),
            display_name: record.username,
            id,
        })
        .collect();
    Json(summaries)
}
