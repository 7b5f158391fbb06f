use axum::{extract::State, Json};
use shared::api::StatusResponse;

use crate::state::AppState;

pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let calendars = state.calendars.status().await;
    Json(StatusResponse::new(calendars))
}
