use serde::Serialize;

/// A regular expression literal: pattern text plus option flags (`i`, `m`, `s`, `x`).
///
/// The pattern is never compiled or checked here; the server interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Pattern {
    pattern: String,
    options: String,
}

impl Pattern {
    pub fn new(pattern: impl Into<String>, options: impl Into<String>) -> Self {
        Pattern {
            pattern: pattern.into(),
            options: options.into(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn options(&self) -> &str {
        &self.options
    }
}

impl From<&regex::Regex> for Pattern {
    fn from(value: &regex::Regex) -> Self {
        Pattern::new(value.as_str(), "")
    }
}

impl From<regex::Regex> for Pattern {
    fn from(value: regex::Regex) -> Self {
        Pattern::new(value.as_str(), "")
    }
}

/// An internal replication timestamp: seconds since the epoch and an ordinal within
/// that second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Timestamp {
    #[serde(rename = "t")]
    time: u32,
    #[serde(rename = "i")]
    increment: u32,
}

impl Timestamp {
    pub fn new(time: u32, increment: u32) -> Self {
        Timestamp { time, increment }
    }

    pub fn time(&self) -> u32 {
        self.time
    }

    pub fn increment(&self) -> u32 {
        self.increment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_from_regex() {
        let regex = regex::Regex::new("^abc.*$").unwrap();
        let pattern = Pattern::from(&regex);
        assert_eq!(pattern.pattern(), "^abc.*$");
        assert_eq!(pattern.options(), "");
    }

    #[test]
    fn test_timestamp_ordering() {
        assert!(Timestamp::new(1, 5) < Timestamp::new(2, 0));
        assert!(Timestamp::new(2, 1) < Timestamp::new(2, 3));
    }
}
