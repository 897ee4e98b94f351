use thiserror::Error;

use crate::comparator::Rule;

#[derive(Error, Debug)]
pub enum RowshapeError {
    #[error("Unknown field: {0}")]
    UnknownField(String),
    #[error("Forbidden operation: {0}")]
    Forbidden(String),
    #[error("Name conflict: {0}")]
    NameConflict(String),
    #[error("Malformed comparator: {message}")]
    MalformedComparator { message: String, line: Option<usize>, col: Option<usize> },
    #[error("Date parse error: '{value}' does not match {pattern}")]
    DateParse { value: String, pattern: String },
    #[error("Invalid instantiation input: {0}")]
    InvalidInput(String),
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),
    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RowshapeError>;

impl RowshapeError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedComparator { message: message.into(), line: None, col: None }
    }
}

// Helper conversions
impl From<config::ConfigError> for RowshapeError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}

impl From<pest::error::Error<Rule>> for RowshapeError {
    fn from(e: pest::error::Error<Rule>) -> Self {
        let (line, col) = match e.line_col {
            pest::error::LineColLocation::Pos((l, c)) => (l, c),
            pest::error::LineColLocation::Span((l, c), _) => (l, c),
        };
        Self::MalformedComparator { message: e.variant.message().to_string(), line: Some(line), col: Some(col) }
    }
}
