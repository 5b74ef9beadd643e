use thiserror::Error;

/// Failure to construct a record from its string fields.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{record}: missing field '{field}'")]
    MissingField {
        record: &'static str,
        field: String,
    },

    #[error("{record}: unexpected field '{field}'")]
    UnexpectedField {
        record: &'static str,
        field: String,
    },

    #[error("{field}: '{value}' does not match {pattern}")]
    Pattern {
        field: &'static str,
        value: String,
        pattern: &'static str,
    },

    #[error("{field}: {value} is outside [{min}, {max}]")]
    Range {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field}: '{value}' is not a number")]
    Number { field: &'static str, value: String },

    #[error("{field}: '{value}' is not one of {}", allowed.join(", "))]
    Choice {
        field: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("malformed related society: '{value}'")]
    RelatedSociety { value: String },
}

pub type Result<T> = std::result::Result<T, ValidationError>;
