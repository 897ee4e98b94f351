//! The map-like protocol and record instantiation.
//!
//! [`FieldMap`] is the capability set a record offers to code that expects an
//! ordinary associative container: get, set, has, keys, entries, clear and
//! delete.
//! [`Record`] implements it restricted to the fields of its schema, while the
//! plain `HashMap` implementation accepts any key. [`instantiate`] turns a mix
//! of positional rows, associative rows and existing records into records of
//! one schema.

use std::collections::HashMap;
use std::hash::BuildHasher;

use serde_json::Value as Json;

use crate::construct::{Record, Schema};
use crate::datatype::Value;
use crate::error::{Result, RowshapeError};

pub trait FieldMap {
    /// Value under `name`, empty when there is none.
    fn get(&self, name: &str) -> &Value;
    fn set(&mut self, name: &str, value: Value) -> Result<()>;
    fn has(&self, name: &str) -> bool;
    /// Keys in iteration order.
    fn keys(&self) -> Vec<String>;
    /// Name and value pairs in the same order as [`FieldMap::keys`].
    fn entries(&self) -> Box<dyn Iterator<Item = (String, &Value)> + '_>;
    fn clear(&mut self);
    /// Removes `name` and returns its value.
    fn delete(&mut self, name: &str) -> Result<Value>;
}

impl FieldMap for Record {
    fn get(&self, name: &str) -> &Value {
        Record::get(self, name)
    }
    fn set(&mut self, name: &str, value: Value) -> Result<()> {
        Record::set(self, name, value)
    }
    fn has(&self, name: &str) -> bool {
        Record::has(self, name)
    }
    fn keys(&self) -> Vec<String> {
        self.schema().names()
    }
    fn entries(&self) -> Box<dyn Iterator<Item = (String, &Value)> + '_> {
        Box::new(self.iter())
    }
    fn clear(&mut self) {
        Record::clear(self)
    }
    fn delete(&mut self, name: &str) -> Result<Value> {
        Record::delete(self, name)
    }
}

static EMPTY: Value = Value::Empty;

impl<S: BuildHasher> FieldMap for HashMap<String, Value, S> {
    fn get(&self, name: &str) -> &Value {
        HashMap::get(self, name).unwrap_or(&EMPTY)
    }
    fn set(&mut self, name: &str, value: Value) -> Result<()> {
        self.insert(name.to_string(), value);
        Ok(())
    }
    fn has(&self, name: &str) -> bool {
        self.contains_key(name)
    }
    fn keys(&self) -> Vec<String> {
        HashMap::keys(self).cloned().collect()
    }
    fn entries(&self) -> Box<dyn Iterator<Item = (String, &Value)> + '_> {
        Box::new(HashMap::iter(self).map(|(name, value)| (name.clone(), value)))
    }
    fn clear(&mut self) {
        HashMap::clear(self)
    }
    fn delete(&mut self, name: &str) -> Result<Value> {
        Ok(self.remove(name).unwrap_or_default())
    }
}

/// One input row for [`instantiate`].
#[derive(Debug, Clone)]
pub enum Input {
    /// Values in schema order.
    Positional(Vec<Value>),
    /// Values by field name. Undeclared names are ignored, missing ones are empty.
    Associative(HashMap<String, Value>),
    /// A record, passed through when it belongs to the target schema and
    /// read by field name otherwise.
    Record(Record),
    /// Arrays are positional, objects are associative.
    Json(Json),
}

impl From<Vec<Value>> for Input {
    fn from(values: Vec<Value>) -> Self {
        Input::Positional(values)
    }
}
impl From<HashMap<String, Value>> for Input {
    fn from(map: HashMap<String, Value>) -> Self {
        Input::Associative(map)
    }
}
impl From<Record> for Input {
    fn from(record: Record) -> Self {
        Input::Record(record)
    }
}
impl From<Json> for Input {
    fn from(json: Json) -> Self {
        Input::Json(json)
    }
}

fn extract(schema: &Schema, source: &impl FieldMap) -> Result<Record> {
    let values: Vec<Value> = schema.names().iter().map(|name| source.get(name).clone()).collect();
    Record::from_values(schema, values)
}

/// Builds one record of `schema` per input, in input order.
pub fn instantiate<I>(schema: &Schema, inputs: I) -> Result<Vec<Record>>
where
    I: IntoIterator,
    I::Item: Into<Input>,
{
    inputs
        .into_iter()
        .map(|input| match input.into() {
            Input::Positional(values) => Record::from_values(schema, values),
            Input::Associative(map) => extract(schema, &map),
            Input::Record(record) if record.schema().same(schema) => Ok(record),
            Input::Record(record) => extract(schema, &record),
            Input::Json(Json::Array(items)) => Record::from_values(schema, items),
            Input::Json(Json::Object(object)) => {
                let map: HashMap<String, Value> = object.into_iter().map(|(k, v)| (k, Value::from(v))).collect();
                extract(schema, &map)
            }
            Input::Json(other) => Err(RowshapeError::InvalidInput(format!(
                "expected a JSON array or object, got {}",
                other
            ))),
        })
        .collect()
}
