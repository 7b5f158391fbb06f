//! In-memory fakes for cache and route tests.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::cache::Clock;
use crate::fetch::{FetchError, Fetcher};

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Serves canned documents per URL and counts requests.
#[derive(Default)]
pub struct FakeFetcher {
    documents: Mutex<HashMap<String, String>>,
    failing: Mutex<HashMap<String, u16>>,
    calls: Mutex<HashMap<String, usize>>,
    total: AtomicUsize,
    delay: Option<std::time::Duration>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every fetch take `delay` before answering.
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_document(self, url: &str, text: &str) -> Self {
        self.set_document(url, text);
        self
    }

    pub fn set_document(&self, url: &str, text: &str) {
        self.failing.lock().unwrap().remove(url);
        self.documents
            .lock()
            .unwrap()
            .insert(url.to_string(), text.to_string());
    }

    /// Make every fetch of `url` fail with the given HTTP status.
    pub fn fail(&self, url: &str, status: u16) {
        self.failing.lock().unwrap().insert(url.to_string(), status);
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self
            .calls
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_insert(0) += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(status) = self.failing.lock().unwrap().get(url) {
            return Err(FetchError::Status { status: *status });
        }

        self.documents
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or(FetchError::Status { status: 404 })
    }
}

/// A minimal raw feed with one private event.
pub fn raw_calendar(uid: &str, summary: &str) -> String {
    format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Test//EN\r\n\
         X-WR-CALNAME:Private\r\n\
         BEGIN:VTIMEZONE\r\n\
         TZID:UTC\r\n\
         END:VTIMEZONE\r\n\
         BEGIN:VEVENT\r\n\
         UID:{}\r\n\
         SUMMARY:{}\r\n\
         DESCRIPTION:top secret\r\n\
         DTSTART:20240101T090000Z\r\n\
         DTEND:20240101T100000Z\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR\r\n",
        uid, summary
    )
}
