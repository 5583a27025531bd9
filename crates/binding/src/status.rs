//! Success-status set derived from a textual range specification.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::ConfigError;

/// Set of status codes treated as non-error, e.g. `"200-299"` or
/// `"200-204,209,301-304"`.
///
/// Parsing is all-or-nothing: one bad token rejects the whole specification
/// and nothing is installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRanges {
    source: String,
    ranges: Vec<RangeInclusive<u16>>,
}

impl StatusRanges {
    /// Parses a comma-separated list of `code` and `min-max` tokens.
    ///
    /// Tokens are trimmed around the numbers. A `min-max` token with
    /// `min > max` matches nothing but is not an error.
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        let mut ranges = Vec::new();
        for token in spec.split(',') {
            let range = match token.split_once('-') {
                None => {
                    let code = parse_code(token)?;
                    code..=code
                }
                Some((min, max)) => parse_code(min)?..=parse_code(max)?,
            };
            ranges.push(range);
        }
        Ok(Self { source: spec.to_owned(), ranges })
    }

    /// The specification string this set was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn contains(&self, code: u16) -> bool {
        self.ranges.iter().any(|range| range.contains(&code))
    }
}

fn parse_code(text: &str) -> Result<u16, ConfigError> {
    text.trim().parse().map_err(|_| ConfigError::invalid_status_ranges(text.trim()))
}

impl Default for StatusRanges {
    fn default() -> Self {
        Self { source: "200-299".to_owned(), ranges: vec![200..=299] }
    }
}

impl FromStr for StatusRanges {
    type Err = ConfigError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        Self::parse(spec)
    }
}

impl fmt::Display for StatusRanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_covers_two_hundreds() {
        let ranges = StatusRanges::default();

        assert!(ranges.contains(200));
        assert!(ranges.contains(204));
        assert!(ranges.contains(299));
        assert!(!ranges.contains(199));
        assert!(!ranges.contains(300));
        assert_eq!(ranges.source(), "200-299");
    }

    #[test]
    fn mixed_singles_and_ranges() {
        let ranges = StatusRanges::parse("200-204,209,301-304").unwrap();

        for code in [200, 201, 202, 203, 204, 209, 301, 302, 303, 304] {
            assert!(ranges.contains(code), "expected {code} to match");
        }
        for code in [205, 208, 210, 300, 305, 404] {
            assert!(!ranges.contains(code), "expected {code} not to match");
        }
    }

    #[test]
    fn tokens_are_trimmed() {
        let ranges = StatusRanges::parse(" 200 - 204 , 209 ").unwrap();

        assert!(ranges.contains(200));
        assert!(ranges.contains(209));
        assert!(!ranges.contains(205));
    }

    #[test]
    fn malformed_specs_are_rejected() {
        for spec in ["abc", "200-", "-299", "200-204-209", "", "200,,300"] {
            let err = StatusRanges::parse(spec);
            assert!(matches!(err, Err(ConfigError::InvalidStatusRanges { .. })), "expected {spec:?} to fail");
        }
    }

    #[test]
    fn reversed_range_matches_nothing() {
        let ranges = StatusRanges::parse("300-200").unwrap();

        assert!(!ranges.contains(200));
        assert!(!ranges.contains(250));
        assert!(!ranges.contains(300));
    }

    #[test]
    fn from_str_round_trips_source() {
        let ranges: StatusRanges = "200,404".parse().unwrap();
        assert_eq!(ranges.to_string(), "200,404");
        assert!(ranges.contains(404));
    }
}
