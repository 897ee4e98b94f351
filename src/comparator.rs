//! Declarative multi-key ordering of records.
//!
//! A specification names one or more fields, each with an optional direction
//! and operator, and compiles once into a [`Comparator`]:
//!
//! ```text
//! spec     := clause (',' clause)*
//! clause   := field (':' sign? operator)?
//! sign     := '+' | '-'
//! operator := 'alpha' | 'cmp' | 'num' | '<=>' | date
//! ```
//! where `date` is `d`, `m` and `y` in any order, each exactly once, joined by
//! any punctuation (`d.m.y`, `y-m-d`, `m/d/y`, `dmy`). Grammar details live in
//! `comparator.pest`. The same field/operator pairs can also be given as a list
//! through [`Comparator::compile_pairs`], where an operator may instead be a
//! custom callback.
//!
//! Clauses are evaluated in order and the first one that does not tie decides.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;
use tracing::debug;

use crate::construct::{Record, Schema, Slot};
use crate::dates::DatePattern;
use crate::datatype::Value;
use crate::error::{Result, RowshapeError};
use crate::settings::Settings;

#[derive(Parser)]
#[grammar = "comparator.pest"]
struct SpecParser;

pub type Callback = Arc<dyn Fn(&Value, &Value) -> Ordering + Send + Sync>;

/// Operator half of a field/operator pair.
#[derive(Clone)]
pub enum OrderSpec {
    /// `[sign] operator` as written after the colon of a clause.
    Spec(String),
    /// Called with the two raw field values, the result is used as is.
    ///
    /// The callback must be a total order over the values it sees.
    /// [`Comparator::sort`] hands it to `slice::sort_by`, which
    /// may panic or leave the slice in an unspecified order otherwise.
    Custom(Callback),
}
impl OrderSpec {
    pub fn custom(f: impl Fn(&Value, &Value) -> Ordering + Send + Sync + 'static) -> Self {
        OrderSpec::Custom(Arc::new(f))
    }
}
impl From<&str> for OrderSpec {
    fn from(s: &str) -> Self {
        OrderSpec::Spec(s.to_string())
    }
}
impl From<String> for OrderSpec {
    fn from(s: String) -> Self {
        OrderSpec::Spec(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Clone)]
pub enum Operator {
    Lexicographic,
    Numeric,
    Date(DatePattern),
    Custom(Callback),
}
impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operator::Lexicographic => write!(f, "Lexicographic"),
            Operator::Numeric => write!(f, "Numeric"),
            Operator::Date(pattern) => write!(f, "Date({})", pattern),
            Operator::Custom(_) => write!(f, "Custom"),
        }
    }
}

/// One compiled clause, with its field resolved to a slot.
#[derive(Debug, Clone)]
pub struct Step {
    field: String,
    slot: Slot,
    direction: Direction,
    operator: Operator,
}
impl Step {
    fn new(schema: &Schema, field: &str, direction: Direction, operator: Operator) -> Result<Self> {
        let slot = schema
            .index_of(field)
            .ok_or_else(|| RowshapeError::UnknownField(field.to_string()))?;
        Ok(Self {
            field: field.to_string(),
            slot,
            direction,
            operator,
        })
    }
    pub fn field(&self) -> &str {
        &self.field
    }
    pub fn direction(&self) -> Direction {
        self.direction
    }
    pub fn operator(&self) -> &Operator {
        &self.operator
    }
    pub fn compare(&self, a: &Record, b: &Record) -> Result<Ordering> {
        let (x, y) = (a.slot(self.slot), b.slot(self.slot));
        let ordering = match &self.operator {
            Operator::Lexicographic => x.cmp_text(y),
            Operator::Numeric => x.cmp_numeric(y),
            Operator::Custom(f) => return Ok(f(x, y)),
            // missing dates go last whatever the direction
            Operator::Date(pattern) => match (pattern.key(x)?, pattern.key(y)?) {
                (Some(left), Some(right)) => left.cmp(&right),
                (Some(_), None) => return Ok(Ordering::Less),
                (None, Some(_)) => return Ok(Ordering::Greater),
                (None, None) => return Ok(Ordering::Equal),
            },
        };
        Ok(match self.direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        })
    }
}

fn default_operator(settings: &Settings) -> Operator {
    if settings.default_numeric {
        Operator::Numeric
    } else {
        Operator::Lexicographic
    }
}

fn parse_order(order: Pair<Rule>, settings: &Settings) -> Result<(Direction, Operator)> {
    let mut direction = Direction::Ascending;
    let mut operator = default_operator(settings);
    for part in order.into_inner() {
        match part.as_rule() {
            Rule::sign if part.as_str() == "-" => direction = Direction::Descending,
            Rule::sign => direction = Direction::Ascending,
            Rule::alpha => operator = Operator::Lexicographic,
            Rule::numeric => operator = Operator::Numeric,
            Rule::date_order => {
                operator = Operator::Date(DatePattern::with_settings(
                    part.as_str(),
                    settings.pivot_year,
                    &settings.markup,
                )?)
            }
            _ => return Err(RowshapeError::malformed(format!("unexpected '{}'", part.as_str()))),
        }
    }
    Ok((direction, operator))
}

/// A composite ordering over records of one schema.
///
/// Slots are resolved when compiling, so a comparator must be compiled again
/// after the schema is reordered or has fields deleted.
#[derive(Debug, Clone)]
pub struct Comparator {
    schema: Schema,
    steps: Vec<Step>,
}

impl Comparator {
    pub fn compile(schema: &Schema, spec: &str) -> Result<Self> {
        Self::compile_with(schema, spec, &Settings::default())
    }
    pub fn compile_with(schema: &Schema, spec: &str, settings: &Settings) -> Result<Self> {
        let parsed = SpecParser::parse(Rule::spec, spec)?
            .next()
            .ok_or_else(|| RowshapeError::malformed("empty specification"))?;
        let mut steps = Vec::new();
        for clause in parsed.into_inner().filter(|p| p.as_rule() == Rule::clause) {
            let mut parts = clause.into_inner();
            let field = parts
                .next()
                .ok_or_else(|| RowshapeError::malformed("clause without a field"))?;
            let (direction, operator) = match parts.next() {
                Some(order) => parse_order(order, settings)?,
                None => (Direction::Ascending, default_operator(settings)),
            };
            steps.push(Step::new(schema, field.as_str(), direction, operator)?);
        }
        debug!(spec, steps = steps.len(), "compiled comparator");
        Ok(Self {
            schema: schema.clone(),
            steps,
        })
    }
    pub fn compile_pairs<I, N, O>(schema: &Schema, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, O)>,
        N: AsRef<str>,
        O: Into<OrderSpec>,
    {
        Self::compile_pairs_with(schema, pairs, &Settings::default())
    }
    pub fn compile_pairs_with<I, N, O>(schema: &Schema, pairs: I, settings: &Settings) -> Result<Self>
    where
        I: IntoIterator<Item = (N, O)>,
        N: AsRef<str>,
        O: Into<OrderSpec>,
    {
        let mut steps = Vec::new();
        for (field, spec) in pairs {
            let (direction, operator) = match spec.into() {
                OrderSpec::Custom(f) => (Direction::Ascending, Operator::Custom(f)),
                OrderSpec::Spec(text) => {
                    let order = SpecParser::parse(Rule::order_only, &text)?
                        .next()
                        .and_then(|p| p.into_inner().find(|p| p.as_rule() == Rule::order))
                        .ok_or_else(|| RowshapeError::malformed(format!("'{}' is not an order", text)))?;
                    parse_order(order, settings)?
                }
            };
            steps.push(Step::new(schema, field.as_ref(), direction, operator)?);
        }
        debug!(steps = steps.len(), "compiled comparator from pairs");
        Ok(Self {
            schema: schema.clone(),
            steps,
        })
    }
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
    fn check(&self, record: &Record) -> Result<()> {
        if !record.schema().same(&self.schema) {
            return Err(RowshapeError::SchemaMismatch(format!(
                "comparator for {} given a record of {}",
                self.schema,
                record.schema()
            )));
        }
        for step in &self.steps {
            if let Operator::Date(pattern) = &step.operator {
                pattern.key(record.slot(step.slot))?;
            }
        }
        Ok(())
    }
    /// The first step that does not tie decides, all ties make the records equal.
    pub fn compare(&self, a: &Record, b: &Record) -> Result<Ordering> {
        self.check(a)?;
        self.check(b)?;
        for step in &self.steps {
            let ordering = step.compare(a, b)?;
            if ordering != Ordering::Equal {
                return Ok(ordering);
            }
        }
        Ok(Ordering::Equal)
    }
    /// Stable sort. Every record is checked up front, so a malformed date
    /// fails the sort before any record has moved.
    ///
    /// # Panics
    /// May panic when a [`OrderSpec::Custom`] callback is not a total order.
    pub fn sort(&self, records: &mut [Record]) -> Result<()> {
        for record in records.iter() {
            self.check(record)?;
        }
        records.sort_by(|a, b| {
            self.steps
                .iter()
                .map(|step| step.compare(a, b).unwrap_or(Ordering::Equal))
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
        Ok(())
    }
}
