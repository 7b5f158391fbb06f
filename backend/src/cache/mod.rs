//! Two-tier calendar cache.
//!
//! [`SourceCache`] holds the raw text of every private feed and refreshes it
//! on a TTL. [`ArtifactCache`] holds one filtered and merged document per
//! published calendar and recomputes it whenever one of its sources has been
//! updated since the last computation.
//!
//! Both registries use the same two-level locking: a short-lived lock over
//! the key set, and per entry an async gate held for the whole fetch or
//! recompute. Values are immutable snapshots swapped in whole, so readers of
//! a populated entry never wait for a refresh in progress.

mod artifact;
mod clock;
mod source;

pub use artifact::ArtifactCache;
pub use clock::{Clock, SystemClock};
pub use source::SourceCache;

use thiserror::Error;

use crate::fetch::FetchError;

#[derive(Debug, Error)]
pub enum CacheError {
    /// No calendar is registered under the requested name
    #[error("unknown calendar '{0}'")]
    UnknownCalendar(String),

    /// Fetching a never-populated source failed
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    /// None of a calendar's sources could be read
    #[error("no source of calendar '{0}' is available")]
    NoSourceAvailable(String),
}

pub type CacheResult<T> = Result<T, CacheError>;
