//! Field-level converters and validators shared by all record types.
//!
//! Converters turn the raw CSV string into a typed value; the matching
//! formatter in this module is its exact inverse for values produced by the
//! converter, so a record loaded and written unchanged reproduces its row.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, ValidationError};

/// A CSV row keyed by header name.
pub type Row = BTreeMap<String, String>;

pub const SOCIETY_ID_PATTERN: &str = "^[A-Za-z][A-Za-z0-9]+$";
pub const XD_ID_PATTERN: &str = "^xd[0-9]+$";
pub const GLOTTOCODE_PATTERN: &str = "^[a-z0-9]{4}[0-9]{4}$";
pub const VARIABLE_ID_PATTERN: &str = r"^[A-Za-z]+[0-9]*(\.[0-9]+)*$";
pub const HRAF_LINK_PATTERN: &str = r"^https?://ehrafworldcultures\.yale\.edu/\S+$";

/// Literal accepted in place of an eHRAF URL while a culture is being added.
pub const HRAF_IN_PROCESS: &str = "in process";

static SOCIETY_ID_RE: LazyLock<Regex> = LazyLock::new(|| compile(SOCIETY_ID_PATTERN));
static XD_ID_RE: LazyLock<Regex> = LazyLock::new(|| compile(XD_ID_PATTERN));
static GLOTTOCODE_RE: LazyLock<Regex> = LazyLock::new(|| compile(GLOTTOCODE_PATTERN));
static VARIABLE_ID_RE: LazyLock<Regex> = LazyLock::new(|| compile(VARIABLE_ID_PATTERN));
static HRAF_LINK_RE: LazyLock<Regex> = LazyLock::new(|| compile(HRAF_LINK_PATTERN));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static field pattern compiles")
}

fn matches(re: &Regex, field: &'static str, pattern: &'static str, value: &str) -> Result<()> {
    if re.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::Pattern {
            field,
            value: value.to_string(),
            pattern,
        })
    }
}

pub fn society_id(field: &'static str, value: &str) -> Result<String> {
    matches(&SOCIETY_ID_RE, field, SOCIETY_ID_PATTERN, value)?;
    Ok(value.to_string())
}

pub fn xd_id(field: &'static str, value: &str) -> Result<String> {
    matches(&XD_ID_RE, field, XD_ID_PATTERN, value)?;
    Ok(value.to_string())
}

pub fn variable_id(field: &'static str, value: &str) -> Result<String> {
    matches(&VARIABLE_ID_RE, field, VARIABLE_ID_PATTERN, value)?;
    Ok(value.to_string())
}

/// Glottocodes are optional; an empty string means "not mapped".
pub fn glottocode(field: &'static str, value: &str) -> Result<String> {
    if !value.is_empty() {
        matches(&GLOTTOCODE_RE, field, GLOTTOCODE_PATTERN, value)?;
    }
    Ok(value.to_string())
}

pub fn is_glottocode(value: &str) -> bool {
    GLOTTOCODE_RE.is_match(value)
}

pub fn hraf_link(field: &'static str, value: &str) -> Result<String> {
    if !value.is_empty() && value != HRAF_IN_PROCESS {
        matches(&HRAF_LINK_RE, field, HRAF_LINK_PATTERN, value)?;
    }
    Ok(value.to_string())
}

pub fn choice(field: &'static str, value: &str, allowed: &'static [&'static str]) -> Result<()> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::Choice {
            field,
            value: value.to_string(),
            allowed,
        })
    }
}

pub fn float(field: &'static str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::Number {
            field,
            value: value.to_string(),
        })
}

pub fn float_in_range(field: &'static str, value: &str, min: f64, max: f64) -> Result<f64> {
    let parsed = float(field, value)?;
    if parsed < min || parsed > max {
        return Err(ValidationError::Range {
            field,
            value: parsed,
            min,
            max,
        });
    }
    Ok(parsed)
}

/// Fixed six-digit precision with trailing zeros and a trailing dot removed.
pub fn format_float(value: f64) -> String {
    let formatted = format!("{value:.6}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

/// Split on `separator`, trimming items and dropping empty ones.
pub fn split_list(value: &str, separator: char) -> Vec<String> {
    value
        .split(separator)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn comma_split(value: &str) -> Vec<String> {
    split_list(value, ',')
}

pub fn semicolon_split(value: &str) -> Vec<String> {
    split_list(value, ';')
}

pub fn comma_join<S: AsRef<str>>(items: &[S]) -> String {
    join(items, ", ")
}

pub fn semicolon_join<S: AsRef<str>>(items: &[S]) -> String {
    join(items, "; ")
}

fn join<S: AsRef<str>>(items: &[S], separator: &str) -> String {
    items
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(separator)
}

/// Upper-case the first character and lower-case the rest.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Typed access to the fields of one row for one record type.
pub(crate) struct RowReader<'a> {
    record: &'static str,
    row: &'a Row,
}

impl<'a> RowReader<'a> {
    pub(crate) fn new(record: &'static str, row: &'a Row) -> Self {
        Self { record, row }
    }

    pub(crate) fn required(&self, field: &str) -> Result<&'a str> {
        self.row
            .get(field)
            .map(String::as_str)
            .ok_or_else(|| ValidationError::MissingField {
                record: self.record,
                field: field.to_string(),
            })
    }

    pub(crate) fn optional(&self, field: &str) -> &'a str {
        self.row.get(field).map(String::as_str).unwrap_or("")
    }

    /// Reject columns that are not part of the record definition.
    pub(crate) fn only(&self, fields: &[&str]) -> Result<()> {
        match self.row.keys().find(|key| !fields.contains(&key.as_str())) {
            Some(extra) => Err(ValidationError::UnexpectedField {
                record: self.record,
                field: extra.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_float_trims_zeros() {
        assert_eq!(format_float(12.5), "12.5");
        assert_eq!(format_float(-3.0), "-3");
        assert_eq!(format_float(0.1234567), "0.123457");
        assert_eq!(format_float(180.0), "180");
    }

    #[test]
    fn split_drops_empty_items() {
        assert_eq!(comma_split(" a, b ,,c "), vec!["a", "b", "c"]);
        assert!(semicolon_split("").is_empty());
    }

    #[test]
    fn capitalize_lowercases_tail() {
        assert_eq!(capitalize("eCONOMY"), "Economy");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn glottocode_may_be_empty() {
        assert_eq!(glottocode("glottocode", "").unwrap(), "");
        assert!(glottocode("glottocode", "abcd123").is_err());
        assert!(glottocode("glottocode", "stan1293").is_ok());
    }

    #[test]
    fn variable_ids_allow_dotted_suffixes() {
        assert!(variable_id("id", "EA001").is_ok());
        assert!(variable_id("id", "B1.2").is_ok());
        assert!(variable_id("id", "1EA").is_err());
    }

    #[test]
    fn hraf_link_accepts_in_process() {
        assert!(hraf_link("HRAF_link", "in process").is_ok());
        assert!(hraf_link("HRAF_link", "").is_ok());
        assert!(
            hraf_link(
                "HRAF_link",
                "https://ehrafworldcultures.yale.edu/cultures/OJ29/description"
            )
            .is_ok()
        );
        assert!(hraf_link("HRAF_link", "http://example.org/x").is_err());
    }
}
