// used for timestamps stored in a record
use chrono::NaiveDate;
// used for decimal numbers
use bigdecimal::BigDecimal;
// used for conversion from and to JSON
use serde_json::{Number, Value as Json};

// used when parsing numbers out of text
use std::str::FromStr;
// used to print out readable forms of a value
use std::fmt;
use std::cmp::Ordering;

use crate::error::RowshapeError;

/// A single cell in a record slot.
///
/// Records are meant for bulk homogeneous data, so a cell is a small
/// dynamically typed value rather than a generic parameter: a database row,
/// a spreadsheet line and a stat record can all be held in the same type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Value {
    /// Never set, cleared, or explicitly null.
    #[default]
    Empty,
    Boolean(bool),
    Integer(i64),
    Decimal(BigDecimal),
    Text(String),
    Date(NaiveDate),
}

impl Value {
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }
    pub fn data_type(&self) -> &'static str {
        match self {
            Value::Empty => "Empty",
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Decimal(_) => "Decimal",
            Value::Text(_) => "Text",
            Value::Date(_) => "Date",
        }
    }
    // Numeric view of the value. Text that does not read as a number,
    // dates and empty cells count as zero.
    pub fn numeric(&self) -> BigDecimal {
        match self {
            Value::Integer(i) => BigDecimal::from(*i),
            Value::Decimal(d) => d.clone(),
            Value::Boolean(b) => BigDecimal::from(*b as i64),
            Value::Text(s) => BigDecimal::from_str(s.trim()).unwrap_or_default(),
            Value::Empty | Value::Date(_) => BigDecimal::default(),
        }
    }
    /// Standard text ordering over the display forms.
    pub fn cmp_text(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (a, b) => a.to_string().cmp(&b.to_string()),
        }
    }
    /// Standard numeric ordering over the numeric views.
    pub fn cmp_numeric(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (a, b) => a.numeric().cmp(&b.numeric()),
        }
    }
    pub fn to_json(&self) -> Json {
        match self {
            Value::Empty => Json::Null,
            Value::Boolean(b) => Json::Bool(*b),
            Value::Integer(i) => Json::Number(Number::from(*i)),
            // JSON numbers cannot carry arbitrary precision
            Value::Decimal(d) => Json::String(d.to_string()),
            Value::Text(s) => Json::String(s.clone()),
            Value::Date(d) => Json::String(d.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Boolean(b) => write!(f, "{}", *b as u8),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Text(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}
impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}
impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}
impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i as i64)
    }
}
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}
impl From<BigDecimal> for Value {
    fn from(d: BigDecimal) -> Self {
        Value::Decimal(d)
    }
}
/// NaN and the infinities have no decimal form and are refused.
impl TryFrom<f64> for Value {
    type Error = RowshapeError;
    fn try_from(f: f64) -> Result<Self, Self::Error> {
        if !f.is_finite() {
            return Err(RowshapeError::InvalidInput(format!("{} is not a finite number", f)));
        }
        BigDecimal::from_str(&f.to_string())
            .map(Value::Decimal)
            .map_err(|e| RowshapeError::InvalidInput(e.to_string()))
    }
}
impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(o: Option<T>) -> Self {
        o.map(Into::into).unwrap_or(Value::Empty)
    }
}

// Nested arrays and objects have no cell form, they are kept as their JSON text.
impl From<Json> for Value {
    fn from(json: Json) -> Self {
        match json {
            Json::Null => Value::Empty,
            Json::Bool(b) => Value::Boolean(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => BigDecimal::from_str(&n.to_string())
                    .map(Value::Decimal)
                    .unwrap_or(Value::Empty),
            },
            Json::String(s) => Value::Text(s),
            nested => Value::Text(nested.to_string()),
        }
    }
}
