use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use crate::error::ApiResult;
use crate::state::AppState;

pub const CALENDAR_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

/// Serve the filtered and merged feed of one published calendar.
pub async fn get_calendar(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let name = name.to_lowercase();
    let snapshot = state.calendars.get(&name).await?;

    Ok((
        [(header::CONTENT_TYPE, CALENDAR_CONTENT_TYPE)],
        snapshot.text.clone(),
    ))
}
