use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Serialize, Deserialize)]
pub struct ScheduleBody {
    pub times: Vec<String>,
}

// GET /schedule
pub async fn get_schedule(State(state): State<Arc<AppState>>) -> Json<ScheduleBody> {
    Json(ScheduleBody {
        times: state.store.load_schedule(),
    })
}

/// Accepted time-of-day layouts.
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

fn validate_time(value: &str) -> Result<(), AppError> {
    if TIME_FORMATS
        .iter()
        .any(|fmt| NaiveTime::parse_from_str(value, fmt).is_ok())
    {
        return Ok(());
    }
    Err(AppError::BadRequest(format!(
        "invalid time '{value}', expected HH:MM or HH:MM:SS"
    )))
}

// POST /schedule
pub async fn update_schedule(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ScheduleBody>,
) -> Result<Json<ScheduleBody>, AppError> {
    for time in &payload.times {
        validate_time(time)?;
    }

    state.store.save_schedule(&payload.times);
    tracing::info!(count = payload.times.len(), "schedule replaced");
    Ok(Json(payload))
}
