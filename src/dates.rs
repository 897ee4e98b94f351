//! Locale free date tokens.
//!
//! A [`DatePattern`] is derived from an ordering token such as `d.m.y`,
//! `y-m-d` or `mdy`: the letters name the position of the day, month and
//! year digit groups and the punctuation between them becomes the literal
//! separator expected in the data. Two-digit years are resolved against a
//! pivot, so with the default pivot of 33 `"1.1.1"` is 2001-01-01 while
//! `"31.12.99"` is 1999-12-31.

use std::fmt;

use chrono::Datelike;
use lazy_static::lazy_static;
use regex::Regex;

use crate::datatype::Value;
use crate::error::{Result, RowshapeError};

pub const DEFAULT_PIVOT: u32 = 33;
pub const DEFAULT_MARKUP: &str = "()[]{}<>";

lazy_static! {
    static ref DATE_TOKEN: Regex = Regex::new(r"^[dmy]+(?:[^A-Za-z0-9,\s]+[dmy]+)*$").unwrap();
}

/// (year, month, day), ordered by year, then month, then day.
pub type DateKey = (i64, u32, u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DatePart {
    Day,
    Month,
    Year,
}

#[derive(Debug, Clone)]
pub struct DatePattern {
    token: String,
    matcher: Regex,
    parts: [DatePart; 3],
    pivot: u32,
    markup: Vec<char>,
}

impl DatePattern {
    pub fn new(token: &str) -> Result<Self> {
        Self::with_settings(token, DEFAULT_PIVOT, DEFAULT_MARKUP)
    }
    pub fn with_settings(token: &str, pivot: u32, markup: &str) -> Result<Self> {
        if !DATE_TOKEN.is_match(token) {
            return Err(RowshapeError::malformed(format!("'{}' is not a date ordering", token)));
        }
        let mut parts = Vec::with_capacity(3);
        // no digit may touch the date on either side
        let mut pattern = String::from(r"(?:^|[^0-9])");
        let mut separator = String::new();
        for c in token.chars() {
            let part = match c {
                'd' => DatePart::Day,
                'm' => DatePart::Month,
                'y' => DatePart::Year,
                _ => {
                    separator.push(c);
                    continue;
                }
            };
            if parts.contains(&part) {
                return Err(RowshapeError::malformed(format!("'{}' repeats '{}'", token, c)));
            }
            pattern += &regex::escape(&separator);
            separator.clear();
            pattern += match part {
                DatePart::Year => r"([0-9]{1,4})",
                _ => r"([0-9]{1,2})",
            };
            parts.push(part);
        }
        pattern += r"(?:[^0-9]|$)";
        let parts: [DatePart; 3] = parts
            .try_into()
            .map_err(|_| RowshapeError::malformed(format!("'{}' must name d, m and y once each", token)))?;
        let matcher = Regex::new(&pattern).map_err(|e| RowshapeError::malformed(e.to_string()))?;
        Ok(Self {
            token: token.to_string(),
            matcher,
            parts,
            pivot,
            markup: markup.chars().collect(),
        })
    }
    pub fn token(&self) -> &str {
        &self.token
    }
    fn resolve_year(&self, year: i64) -> i64 {
        match year {
            y if y < self.pivot as i64 => 2000 + y,
            y if y < 100 => 1900 + y,
            y => y,
        }
    }
    /// Parses raw text into a date key. Text that is empty once markup and
    /// surrounding whitespace are stripped is a missing date.
    pub fn parse(&self, raw: &str) -> Result<Option<DateKey>> {
        let stripped: String = raw.chars().filter(|c| !self.markup.contains(c)).collect();
        let stripped = stripped.trim();
        if stripped.is_empty() {
            return Ok(None);
        }
        let failed = || RowshapeError::DateParse {
            value: raw.to_string(),
            pattern: self.token.clone(),
        };
        let captures = self.matcher.captures(stripped).ok_or_else(failed)?;
        let (mut year, mut month, mut day) = (0i64, 0u32, 0u32);
        for (i, part) in self.parts.iter().enumerate() {
            let digits = captures.get(i + 1).ok_or_else(failed)?.as_str();
            match part {
                DatePart::Year => year = self.resolve_year(digits.parse().map_err(|_| failed())?),
                DatePart::Month => month = digits.parse().map_err(|_| failed())?,
                DatePart::Day => day = digits.parse().map_err(|_| failed())?,
            }
        }
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(failed());
        }
        Ok(Some((year, month, day)))
    }
    pub fn key(&self, value: &Value) -> Result<Option<DateKey>> {
        match value {
            Value::Empty => Ok(None),
            Value::Date(d) => Ok(Some((d.year() as i64, d.month(), d.day()))),
            Value::Text(s) => self.parse(s),
            other => self.parse(&other.to_string()),
        }
    }
}

impl fmt::Display for DatePattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pivot_splits_centuries() {
        let pattern = DatePattern::new("d.m.y").unwrap();
        assert_eq!(pattern.parse("1.1.1").unwrap(), Some((2001, 1, 1)));
        assert_eq!(pattern.parse("31.12.99").unwrap(), Some((1999, 12, 31)));
        assert_eq!(pattern.parse("1.1.32").unwrap(), Some((2032, 1, 1)));
        assert_eq!(pattern.parse("1.1.33").unwrap(), Some((1933, 1, 1)));
        assert_eq!(pattern.parse("1.1.1685").unwrap(), Some((1685, 1, 1)));
    }

    #[test]
    fn markup_is_stripped() {
        let pattern = DatePattern::new("y-m-d").unwrap();
        assert_eq!(pattern.parse("<b>[2004-06-19]</b>").unwrap(), Some((2004, 6, 19)));
        assert_eq!(pattern.parse(" () ").unwrap(), None);
    }

    #[test]
    fn adjacent_letters_use_fixed_widths() {
        let pattern = DatePattern::new("dmy").unwrap();
        assert_eq!(pattern.parse("311299").unwrap(), Some((1999, 12, 31)));
    }

    #[test]
    fn tokens_must_name_each_part_once() {
        assert!(DatePattern::new("d.m").is_err());
        assert!(DatePattern::new("d.d.y").is_err());
        assert!(DatePattern::new("d.m.x").is_err());
        assert!(DatePattern::new("mm/dd/yy").is_err());
    }

    #[test]
    fn malformed_dates_fail() {
        let pattern = DatePattern::new("m/d/y").unwrap();
        let err = pattern.parse("yesterday").unwrap_err();
        assert!(matches!(err, RowshapeError::DateParse { .. }));
    }

    #[test]
    fn digits_touching_the_date_are_refused() {
        let pattern = DatePattern::new("d.m.y").unwrap();
        for raw in ["123.12.99", "1.1.12345", "0.1.99", "1.13.99"] {
            let err = pattern.parse(raw).unwrap_err();
            assert!(matches!(err, RowshapeError::DateParse { .. }), "{raw}");
        }
        assert_eq!(pattern.parse("on 3.4.05, noon").unwrap(), Some((2005, 4, 3)));
    }

    #[test]
    fn wrong_part_order_is_not_truncated() {
        let pattern = DatePattern::new("d-m-y").unwrap();
        assert!(pattern.parse("2004-06-19").is_err());
    }

    #[test]
    fn only_ascii_digits_count() {
        let pattern = DatePattern::new("d.m.y").unwrap();
        let err = pattern.parse("\u{661}.\u{661}.\u{661}").unwrap_err();
        assert!(matches!(err, RowshapeError::DateParse { .. }));
    }
}
