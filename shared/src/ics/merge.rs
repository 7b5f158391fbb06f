use std::collections::HashSet;

use super::{lines, CRLF};

const BEGIN_CALENDAR: &str = "BEGIN:VCALENDAR";
const END_CALENDAR: &str = "END:VCALENDAR";
const BEGIN_TIMEZONE: &str = "BEGIN:VTIMEZONE";
const END_TIMEZONE: &str = "END:VTIMEZONE";
const BEGIN_EVENT: &str = "BEGIN:VEVENT";
const END_EVENT: &str = "END:VEVENT";
const TZID_PREFIX: &str = "TZID:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseMode {
    Default,
    TimeZone,
    Event,
}

/// One VTIMEZONE or VEVENT, brackets included.
type Block<'a> = Vec<&'a str>;

/// Accumulates the pieces of several calendars before rendering one.
#[derive(Debug, Default)]
struct MergedCalendar<'a> {
    default_lines: Vec<&'a str>,
    seen_default_lines: HashSet<&'a str>,
    time_zones: Vec<Block<'a>>,
    events: Vec<Block<'a>>,
}

impl<'a> MergedCalendar<'a> {
    fn add_document(&mut self, text: &'a str) {
        let mut mode = ParseMode::Default;
        let mut current: Block<'a> = Vec::new();

        for line in lines(text) {
            match mode {
                ParseMode::Default => match line {
                    BEGIN_CALENDAR | END_CALENDAR => {}
                    BEGIN_TIMEZONE => {
                        mode = ParseMode::TimeZone;
                        current = vec![line];
                    }
                    BEGIN_EVENT => {
                        mode = ParseMode::Event;
                        current = vec![line];
                    }
                    _ => self.add_default_line(line),
                },
                ParseMode::TimeZone => {
                    current.push(line);
                    if line == END_TIMEZONE {
                        self.time_zones.push(std::mem::take(&mut current));
                        mode = ParseMode::Default;
                    }
                }
                ParseMode::Event => {
                    current.push(line);
                    if line == END_EVENT {
                        self.events.push(std::mem::take(&mut current));
                        mode = ParseMode::Default;
                    }
                }
            }
        }

        // A block left open at the end of a document is discarded.
    }

    fn add_default_line(&mut self, line: &'a str) {
        if self.seen_default_lines.insert(line) {
            self.default_lines.push(line);
        }
    }

    /// Timezone blocks with the first occurrence of each TZID kept. Blocks
    /// without a TZID are always kept.
    fn distinct_time_zones(&self) -> Vec<&Block<'a>> {
        let mut seen: HashSet<&str> = HashSet::new();

        self.time_zones
            .iter()
            .filter(|block| match time_zone_id(block) {
                Some(id) => seen.insert(id),
                None => true,
            })
            .collect()
    }

    fn render(&self) -> String {
        let mut result = String::new();
        let mut push = |line: &str| {
            result.push_str(line);
            result.push_str(CRLF);
        };

        push(BEGIN_CALENDAR);
        for line in &self.default_lines {
            push(*line);
        }
        for block in self.distinct_time_zones() {
            for line in block {
                push(*line);
            }
        }
        for block in &self.events {
            for line in block {
                push(*line);
            }
        }
        push(END_CALENDAR);

        result
    }
}

fn time_zone_id<'a>(block: &[&'a str]) -> Option<&'a str> {
    block
        .iter()
        .find_map(|line| line.strip_prefix(TZID_PREFIX))
}

/// Merge filtered calendars into a single VCALENDAR.
///
/// Top-level properties are unioned in first-seen order, timezones are
/// deduplicated by TZID, and events from every document are concatenated in
/// document order.
pub fn merge<I, S>(documents: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let documents: Vec<S> = documents.into_iter().collect();
    let mut calendar = MergedCalendar::default();

    for document in &documents {
        calendar.add_document(document.as_ref());
    }

    calendar.render()
}
