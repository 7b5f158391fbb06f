//! Line-oriented ICS transformations.
//!
//! Neither function parses iCalendar properly: documents are treated as a
//! flat list of lines, and anything unexpected is dropped rather than
//! reported.

mod filter;
mod merge;

pub use filter::filter;
pub use merge::merge;

/// iCalendar line terminator.
pub const CRLF: &str = "\r\n";

/// Split a document into non-empty lines.
///
/// Lines are CRLF terminated, but a bare LF is tolerated and the trailing
/// `\r` is stripped either way.
pub(crate) fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_accepts_crlf_and_lf() {
        let collected: Vec<_> = lines("A:1\r\nB:2\nC:3\r\n\r\n").collect();
        assert_eq!(collected, vec!["A:1", "B:2", "C:3"]);
    }

    #[test]
    fn test_lines_empty_document() {
        assert_eq!(lines("").count(), 0);
        assert_eq!(lines("\r\n\r\n").count(), 0);
    }
}
