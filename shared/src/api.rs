use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Status API Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarStatus {
    pub name: String,
    pub last_computed: Option<DateTime<Utc>>,
    pub sources: usize,
    pub sources_fetched: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub calendars: Vec<CalendarStatus>,
    pub total: usize,
}

impl StatusResponse {
    pub fn new(calendars: Vec<CalendarStatus>) -> Self {
        let total = calendars.len();
        Self { calendars, total }
    }
}

// ============================================================================
// Error Response
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
