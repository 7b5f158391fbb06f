use serde::{Deserialize, Serialize};
use validator::Validate;

/// A published calendar and the private feeds it is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CalendarConfig {
    /// Display name, also the (case-insensitive) path segment it is served under.
    #[validate(length(min = 1))]
    pub name: String,

    /// Upstream feed URLs, merged in this order.
    #[validate(length(min = 1))]
    pub private_urls: Vec<String>,
}

impl CalendarConfig {
    pub fn new(name: impl Into<String>, private_urls: Vec<String>) -> Self {
        Self {
            name: name.into(),
            private_urls,
        }
    }

    /// Key used for lookups; path segments are lower-cased before matching.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}
