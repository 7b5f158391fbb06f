use super::{lines, CRLF};

/// Component brackets that survive filtering.
const KEPT_COMPONENTS: &[&str] = &["VCALENDAR", "VTIMEZONE", "DAYLIGHT", "STANDARD", "VEVENT"];

/// Properties copied through untouched.
const KEPT_PROPERTIES: &[&str] = &[
    "VERSION",
    "CALSCALE",
    "REFRESH-INTERVAL",
    "X-PUBLISHED-TTL",
    "TZID",
    "TZOFFSETFROM",
    "TZOFFSETTO",
    "TZNAME",
    "DTSTART",
    "DTEND",
    "RRULE",
    "UID",
    "X-MOZ-LASTACK",
    "X-MOZ-GENERATION",
];

/// Date-time lines with a TZID parameter are kept whole.
const ZONED_PREFIXES: &[&str] = &["DTSTART;TZID=", "DTEND;TZID="];

const REDACTED_SUMMARY: &str = "Busy";
const REDACTED_COLOR: &str = "#ffffff";

/// What happens to a single input line.
#[derive(Debug, PartialEq, Eq)]
enum LineAction<'a> {
    Keep,
    Replace(&'a str, &'a str),
    Drop,
}

fn classify<'a>(line: &str, calendar_name: &'a str) -> LineAction<'a> {
    if line.chars().count() < 3 {
        return LineAction::Drop;
    }

    if ZONED_PREFIXES.iter().any(|prefix| line.starts_with(prefix)) {
        return LineAction::Keep;
    }

    let (name, value) = match line.split_once(':') {
        Some((name, value)) if !name.is_empty() => (name, value),
        _ => return LineAction::Drop,
    };

    match name {
        "BEGIN" | "END" if KEPT_COMPONENTS.contains(&value) => LineAction::Keep,
        "BEGIN" | "END" => LineAction::Drop,
        "X-WR-CALNAME" => LineAction::Replace("X-WR-CALNAME", calendar_name),
        "X-APPLE-CALENDAR-COLOR" => LineAction::Replace("X-APPLE-CALENDAR-COLOR", REDACTED_COLOR),
        "SUMMARY" => LineAction::Replace("SUMMARY", REDACTED_SUMMARY),
        _ if KEPT_PROPERTIES.contains(&name) => LineAction::Keep,
        _ => LineAction::Drop,
    }
}

/// Redact a raw ICS document down to its busy/free structure.
///
/// Works on an allow-list: component brackets, timezone definitions, start and
/// end times, recurrence rules and UIDs are kept; titles become `Busy`; the
/// calendar name is replaced with `calendar_name`; everything else is dropped.
/// The result is CRLF terminated.
pub fn filter(text: &str, calendar_name: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for line in lines(text) {
        match classify(line, calendar_name) {
            LineAction::Keep => result.push_str(line),
            LineAction::Replace(name, value) => {
                result.push_str(name);
                result.push(':');
                result.push_str(value);
            }
            LineAction::Drop => continue,
        }
        result.push_str(CRLF);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "BEGIN:VCALENDAR\r\n\
        VERSION:2.0\r\n\
        PRODID:-//Example Corp//Calendar//EN\r\n\
        X-WR-CALNAME:Alice Private\r\n\
        X-APPLE-CALENDAR-COLOR:#ff0000\r\n\
        BEGIN:VTIMEZONE\r\n\
        TZID:Europe/Zurich\r\n\
        BEGIN:STANDARD\r\n\
        TZOFFSETFROM:+0200\r\n\
        TZOFFSETTO:+0100\r\n\
        TZNAME:CET\r\n\
        DTSTART:19701025T030000\r\n\
        END:STANDARD\r\n\
        END:VTIMEZONE\r\n\
        BEGIN:VEVENT\r\n\
        UID:event-1@example.com\r\n\
        SUMMARY:Dentist appointment\r\n\
        DESCRIPTION:secret meeting details\r\n\
        LOCATION:Main Street 1\r\n\
        ATTENDEE;CN=Bob:mailto:bob@example.com\r\n\
        DTSTART;TZID=Europe/Zurich:20240101T090000\r\n\
        DTEND;TZID=Europe/Zurich:20240101T100000\r\n\
        RRULE:FREQ=WEEKLY;BYDAY=MO\r\n\
        BEGIN:VALARM\r\n\
        ACTION:DISPLAY\r\n\
        END:VALARM\r\n\
        END:VEVENT\r\n\
        END:VCALENDAR\r\n";

    #[test]
    fn test_filter_redacts_event() {
        let filtered = filter(RAW, "Alice");

        let expected = "BEGIN:VCALENDAR\r\n\
            VERSION:2.0\r\n\
            X-WR-CALNAME:Alice\r\n\
            X-APPLE-CALENDAR-COLOR:#ffffff\r\n\
            BEGIN:VTIMEZONE\r\n\
            TZID:Europe/Zurich\r\n\
            BEGIN:STANDARD\r\n\
            TZOFFSETFROM:+0200\r\n\
            TZOFFSETTO:+0100\r\n\
            TZNAME:CET\r\n\
            DTSTART:19701025T030000\r\n\
            END:STANDARD\r\n\
            END:VTIMEZONE\r\n\
            BEGIN:VEVENT\r\n\
            UID:event-1@example.com\r\n\
            SUMMARY:Busy\r\n\
            DTSTART;TZID=Europe/Zurich:20240101T090000\r\n\
            DTEND;TZID=Europe/Zurich:20240101T100000\r\n\
            RRULE:FREQ=WEEKLY;BYDAY=MO\r\n\
            END:VEVENT\r\n\
            END:VCALENDAR\r\n";
        assert_eq!(filtered, expected);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let once = filter(RAW, "Alice");
        let twice = filter(&once, "Alice");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_drops_unknown_properties() {
        let filtered = filter(RAW, "Alice");
        assert!(!filtered.contains("secret meeting details"));
        assert!(!filtered.contains("DESCRIPTION"));
        assert!(!filtered.contains("LOCATION"));
        assert!(!filtered.contains("ATTENDEE"));
        assert!(!filtered.contains("PRODID"));
        assert!(!filtered.contains("VALARM"));
    }

    #[test]
    fn test_filter_never_leaks_summary_or_color() {
        let raw = "SUMMARY:Job interview at Acme\r\n\
            SUMMARY:\r\n\
            X-APPLE-CALENDAR-COLOR:#123456\r\n";
        let filtered = filter(raw, "Alice");

        for line in filtered.split("\r\n").filter(|l| !l.is_empty()) {
            match line.split_once(':') {
                Some(("SUMMARY", value)) => assert_eq!(value, "Busy"),
                Some(("X-APPLE-CALENDAR-COLOR", value)) => assert_eq!(value, "#ffffff"),
                other => panic!("unexpected line {:?}", other),
            }
        }
    }

    #[test]
    fn test_filter_drops_malformed_lines() {
        let raw = "UI\r\n:UID:leading-colon\r\nNOCOLONHERE\r\nUID:ok\r\n";
        assert_eq!(filter(raw, "x"), "UID:ok\r\n");
    }

    #[test]
    fn test_filter_drops_other_components() {
        let raw = "BEGIN:VTODO\r\nBEGIN:VEVENT\r\nEND:VEVENT\r\nEND:VTODO\r\n";
        assert_eq!(filter(raw, "x"), "BEGIN:VEVENT\r\nEND:VEVENT\r\n");
    }

    #[test]
    fn test_filter_drops_parameterized_properties() {
        // Only DTSTART/DTEND carry TZID parameters through.
        let raw = "DTSTART;VALUE=DATE:20240101\r\nSUMMARY;LANGUAGE=en:Secret\r\n";
        assert_eq!(filter(raw, "x"), "");
    }

    #[test]
    fn test_filter_normalizes_line_endings() {
        let raw = "BEGIN:VCALENDAR\nUID:abc\nEND:VCALENDAR";
        assert_eq!(filter(raw, "x"), "BEGIN:VCALENDAR\r\nUID:abc\r\nEND:VCALENDAR\r\n");
    }

    #[test]
    fn test_filter_empty_input() {
        assert_eq!(filter("", "x"), "");
    }
}
