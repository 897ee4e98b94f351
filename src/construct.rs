use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

// name lookups use a fast hash rather than the DoS resistant default
use core::hash::BuildHasherDefault;
use seahash::SeaHasher;
use std::collections::{HashMap, HashSet};

// used to print out readable forms of a construct
use std::fmt;

use tracing::{debug, trace};

use crate::datatype::Value;
use crate::error::{Result, RowshapeError};

pub type FieldHasher = BuildHasherDefault<SeaHasher>;

/// Key reserved for "the schema that produced this record". It can never be
/// declared as a field, the schema itself is reached through [`Record::schema`].
pub const SCHEMA_KEY: &str = "__schema__";

// Slot 0 is the "no such field" sentinel, fields occupy 1..=len.
pub type Slot = usize;

// ------------- Layout -------------
#[derive(Debug, Clone, Default)]
struct Layout {
    names: Vec<String>,
    slots: HashMap<String, Slot, FieldHasher>,
}
impl Layout {
    fn reindex(&mut self) {
        self.slots.clear();
        for (i, name) in self.names.iter().enumerate() {
            self.slots.insert(name.clone(), i + 1);
        }
    }
}

// ------------- Schema -------------
/// The shared, ordered field set of a family of records.
///
/// `Schema` is a handle: cloning it shares the underlying field set, and every
/// [`Record`] created against it holds such a handle. Shape changes made
/// through any handle are visible to all of them. Use [`Schema::deep_clone`]
/// for an independent copy.
///
/// [`Schema::delete`] and [`Schema::reorder`] move fields to other slots and
/// hand back a [`Mutator`]. The schema keeps no registry of its records, so the
/// caller must apply that mutator to every live record before using it again.
#[derive(Clone, Default)]
pub struct Schema {
    layout: Arc<RwLock<Layout>>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_fields<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let schema = Self::new();
        schema.add(names)?;
        Ok(schema)
    }
    // A panic can only poison the lock between complete shape changes.
    fn read(&self) -> RwLockReadGuard<'_, Layout> {
        self.layout.read().unwrap_or_else(PoisonError::into_inner)
    }
    fn write(&self) -> RwLockWriteGuard<'_, Layout> {
        self.layout.write().unwrap_or_else(PoisonError::into_inner)
    }
    /// Appends the names not already declared and returns how many were added.
    pub fn add<I, S>(&self, names: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<S> = names.into_iter().collect();
        if names.iter().any(|n| n.as_ref() == SCHEMA_KEY) {
            return Err(RowshapeError::Forbidden(format!("'{}' is reserved", SCHEMA_KEY)));
        }
        let mut layout = self.write();
        let mut added = 0;
        for name in names {
            let name = name.as_ref();
            if layout.slots.contains_key(name) {
                continue;
            }
            layout.names.push(name.to_string());
            let slot = layout.names.len();
            layout.slots.insert(name.to_string(), slot);
            added += 1;
        }
        debug!(added, fields = layout.names.len(), "added fields");
        Ok(added)
    }
    /// Removes the given names, ignoring unknown ones. The returned mutator
    /// splices the removed slots out of records laid out the old way.
    pub fn delete<I, S>(&self, names: I) -> Mutator
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut layout = self.write();
        let mut removed: Vec<usize> = names
            .into_iter()
            .filter_map(|n| layout.slots.get(n.as_ref()).map(|slot| slot - 1))
            .collect();
        removed.sort_unstable();
        removed.dedup();
        let width = layout.names.len();
        for position in removed.iter().rev() {
            layout.names.remove(*position);
        }
        layout.reindex();
        debug!(removed = removed.len(), fields = layout.names.len(), "deleted fields");
        Mutator {
            schema: self.clone(),
            width,
            change: Change::Splice(removed),
        }
    }
    /// Moves the given names to the front, in the given order, with the
    /// remaining names following in their current relative order.
    pub fn reorder<I, S>(&self, names: I) -> Result<Mutator>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut layout = self.write();
        let width = layout.names.len();
        let mut order: Vec<usize> = Vec::with_capacity(width);
        for name in names {
            let name = name.as_ref();
            let slot = layout
                .slots
                .get(name)
                .ok_or_else(|| RowshapeError::UnknownField(name.to_string()))?;
            if !order.contains(&(slot - 1)) {
                order.push(slot - 1);
            }
        }
        let leading: HashSet<usize> = order.iter().copied().collect();
        order.extend((0..width).filter(|position| !leading.contains(position)));
        let names = order.iter().map(|position| layout.names[*position].clone()).collect();
        layout.names = names;
        layout.reindex();
        debug!(fields = width, "reordered fields");
        Ok(Mutator {
            schema: self.clone(),
            width,
            change: Change::Permute(order),
        })
    }
    /// Renames fields in place. Either every pair is applied or none is.
    pub fn rename<I, O, N>(&self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (O, N)>,
        O: AsRef<str>,
        N: AsRef<str>,
    {
        let mut layout = self.write();
        let mut names = layout.names.clone();
        for (old, new) in pairs {
            let (old, new) = (old.as_ref(), new.as_ref());
            if new == SCHEMA_KEY {
                return Err(RowshapeError::Forbidden(format!("'{}' is reserved", SCHEMA_KEY)));
            }
            let slot = layout
                .slots
                .get(old)
                .ok_or_else(|| RowshapeError::UnknownField(old.to_string()))?;
            names[slot - 1] = new.to_string();
        }
        let duplicate = {
            let mut seen = HashSet::with_capacity(names.len());
            names.iter().find(|name| !seen.insert(name.as_str())).cloned()
        };
        if let Some(duplicate) = duplicate {
            return Err(RowshapeError::NameConflict(format!("'{}' would be declared twice", duplicate)));
        }
        layout.names = names;
        layout.reindex();
        debug!(fields = layout.names.len(), "renamed fields");
        Ok(())
    }
    pub fn names(&self) -> Vec<String> {
        self.read().names.clone()
    }
    pub fn count(&self) -> usize {
        self.read().names.len()
    }
    pub fn contains(&self, name: &str) -> bool {
        self.read().slots.contains_key(name)
    }
    /// The 1-based slot of a field.
    pub fn index_of(&self, name: &str) -> Option<Slot> {
        self.read().slots.get(name).copied()
    }
    /// An independent copy: later changes to either schema do not affect the other.
    pub fn deep_clone(&self) -> Schema {
        let layout = self.read().clone();
        Schema {
            layout: Arc::new(RwLock::new(layout)),
        }
    }
    /// Whether both handles refer to the same schema.
    pub fn same(&self, other: &Schema) -> bool {
        Arc::ptr_eq(&self.layout, &other.layout)
    }
}
impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Schema").field(&self.read().names).finish()
    }
}
impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({})", self.read().names.join(", "))
    }
}

// ------------- Mutator -------------
#[derive(Debug, Clone)]
enum Change {
    // 0-based positions removed, ascending
    Splice(Vec<usize>),
    // new position i takes the value of old position order[i]
    Permute(Vec<usize>),
}

/// Brings a record laid out for the schema shape before a delete or reorder
/// in line with the shape after it. Apply it exactly once per record.
#[derive(Debug, Clone)]
pub struct Mutator {
    schema: Schema,
    width: usize,
    change: Change,
}
impl Mutator {
    pub fn apply(&self, record: &mut Record) -> Result<()> {
        if !record.schema.same(&self.schema) {
            return Err(RowshapeError::SchemaMismatch(format!(
                "record of {} cannot be mutated for {}",
                record.schema, self.schema
            )));
        }
        // records grow lazily, so pad up to the old width first
        if record.values.len() < self.width {
            record.values.resize(self.width, Value::Empty);
        }
        match &self.change {
            Change::Splice(removed) => {
                for position in removed.iter().rev() {
                    record.values.remove(*position);
                }
            }
            Change::Permute(order) => {
                let mut old = std::mem::take(&mut record.values);
                let rest = old.split_off(self.width);
                record.values = order.iter().map(|position| std::mem::take(&mut old[*position])).collect();
                record.values.extend(rest);
            }
        }
        trace!(slots = record.values.len(), "mutated record");
        Ok(())
    }
    pub fn apply_all(&self, records: &mut [Record]) -> Result<()> {
        for record in records.iter_mut() {
            self.apply(record)?;
        }
        Ok(())
    }
}

// ------------- Record -------------
static EMPTY: Value = Value::Empty;

/// One row of values, one per field of its schema, addressed by field name.
///
/// Writes are restricted to declared fields and a single field can never be
/// removed from a record; see [`crate::interface::FieldMap`] for the protocol.
#[derive(Debug, Clone)]
pub struct Record {
    schema: Schema,
    values: Vec<Value>,
}
impl Record {
    pub fn new(schema: &Schema) -> Self {
        Self {
            schema: schema.clone(),
            values: vec![Value::Empty; schema.count()],
        }
    }
    /// Positional construction in schema order. Missing trailing values are empty.
    pub fn from_values<I, V>(schema: &Schema, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let count = schema.count();
        if values.len() > count {
            return Err(RowshapeError::InvalidInput(format!(
                "{} values given for {} fields",
                values.len(),
                count
            )));
        }
        values.resize(count, Value::Empty);
        Ok(Self {
            schema: schema.clone(),
            values,
        })
    }
    /// The schema that produced this record.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }
    pub(crate) fn slot(&self, slot: Slot) -> &Value {
        slot.checked_sub(1)
            .and_then(|position| self.values.get(position))
            .unwrap_or(&EMPTY)
    }
    /// Value of a field, empty for fields never set and for undeclared names.
    pub fn get(&self, name: &str) -> &Value {
        match self.schema.index_of(name) {
            Some(slot) => self.slot(slot),
            None => &EMPTY,
        }
    }
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        if name == SCHEMA_KEY {
            return Err(RowshapeError::Forbidden(format!("'{}' is read-only", SCHEMA_KEY)));
        }
        let slot = self
            .schema
            .index_of(name)
            .ok_or_else(|| RowshapeError::UnknownField(name.to_string()))?;
        if self.values.len() < slot {
            self.values.resize(slot, Value::Empty);
        }
        self.values[slot - 1] = value.into();
        Ok(())
    }
    /// Whether the schema declares the field, set or not.
    pub fn has(&self, name: &str) -> bool {
        self.schema.contains(name)
    }
    /// Empties every value, keeping the slots.
    pub fn clear(&mut self) {
        let count = self.schema.count().max(self.values.len());
        self.values.clear();
        self.values.resize(count, Value::Empty);
    }
    pub fn delete(&mut self, name: &str) -> Result<Value> {
        Err(RowshapeError::Forbidden(format!(
            "cannot delete '{}' from a single record, delete it from the schema",
            name
        )))
    }
    /// (name, value) pairs in the field order the schema has right now.
    pub fn iter(&self) -> Fields<'_> {
        Fields {
            record: self,
            names: self.schema.names().into_iter(),
            slot: 0,
        }
    }
    /// Values in schema order, one per declared field.
    pub fn values(&self) -> Vec<Value> {
        (1..=self.schema.count()).map(|slot| self.slot(slot).clone()).collect()
    }
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(self.iter().map(|(name, value)| (name, value.to_json())).collect())
    }
}
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let fields: Vec<String> = self.iter().map(|(name, value)| format!("{}: {}", name, value)).collect();
        write!(f, "{{{}}}", fields.join(", "))
    }
}
impl<'a> IntoIterator for &'a Record {
    type Item = (String, &'a Value);
    type IntoIter = Fields<'a>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct Fields<'a> {
    record: &'a Record,
    names: std::vec::IntoIter<String>,
    slot: Slot,
}
impl<'a> Iterator for Fields<'a> {
    type Item = (String, &'a Value);
    fn next(&mut self) -> Option<Self::Item> {
        let name = self.names.next()?;
        self.slot += 1;
        Some((name, self.record.slot(self.slot)))
    }
}
