use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;

use crate::config::AppConfig;
use crate::services::oauth::{self, AuthFlowError};
use crate::state::AppState;

pub const CALLBACK_PATH: &str = "/auth/instagram/callback";

/// Callback URL registered with the provider. Start and callback must agree,
/// so both go through here.
pub fn redirect_uri(config: &AppConfig, headers: &HeaderMap) -> String {
    if let Some(base) = &config.public_base_url {
        return format!("{base}{CALLBACK_PATH}");
    }

    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get("x-forwarded-host")
        .or_else(|| headers.get("host"))
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("{proto}://{host}{CALLBACK_PATH}")
}

// GET /auth/instagram
pub async fn start(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Redirect {
    let redirect_uri = redirect_uri(&state.config, &headers);
    let url = oauth::consent_url(
        &state.config.app_id,
        &redirect_uri,
        &state.config.graph_api_version,
    );
    tracing::info!(redirect_uri = %redirect_uri, "redirecting to consent screen");
    Redirect::temporary(&url)
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn error_page(status: StatusCode, title: &str, detail: &str) -> Response {
    let body = format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{title}</title></head>\
         <body><h1>{title}</h1><pre>{}</pre></body></html>",
        escape_html(detail)
    );
    (status, Html(body)).into_response()
}

// GET /auth/instagram/callback
pub async fn callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Response {
    if let Some(error) = query.error {
        let description = query
            .error_description
            .unwrap_or_else(|| "Unknown error".to_string());
        tracing::warn!(error = %error, description = %description, "authorization denied");
        return error_page(
            StatusCode::BAD_REQUEST,
            "Authorization failed",
            &format!("{error}: {description}"),
        );
    }

    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        return error_page(
            StatusCode::BAD_REQUEST,
            "Authorization failed",
            "missing 'code' parameter",
        );
    };

    let redirect_uri = redirect_uri(&state.config, &headers);
    match oauth::complete_authorization(&*state.graph, &state.store, &code, &redirect_uri)
        .await
    {
        Ok(account) => {
            let page = account
                .page_name
                .map(|p| format!(" via page {}", escape_html(&p)))
                .unwrap_or_default();
            Html(format!(
                "<!doctype html><html><head><meta charset=\"utf-8\"><title>Connected</title></head>\
                 <body><h1>Account connected</h1><p>@{} ({}){page}</p>\
                 <p>You can close this window.</p></body></html>",
                escape_html(&account.username),
                escape_html(&account.id),
            ))
            .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "authorization flow failed");
            let status = match e {
                AuthFlowError::NoLinkedAccount => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_GATEWAY,
            };
            error_page(status, "Authorization failed", &e.to_string())
        }
    }
}
