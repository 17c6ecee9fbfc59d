//! Pipeline tuples and store documents.
//!
//! - [`Document`]: a store record, field name to value, in stable key order
//! - [`Tuple`]: an ordered sequence of values
//! - [`TupleEntry`]: a tuple paired with the field set that addresses it

use crate::fields::{FieldId, FieldSet};

/// A single field value.
pub type Value = serde_json::Value;

/// A store-resident record.
///
/// Iteration follows insertion order, so an undefined-field read yields
/// values in the order the store produced them.
pub type Document = serde_json::Map<String, Value>;

/// An ordered, positionally addressable record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tuple {
    values: Vec<Value>,
}

impl Tuple {
    /// Creates an empty tuple.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tuple of `size` null values.
    #[must_use]
    pub fn with_size(size: usize) -> Self {
        Self {
            values: vec![Value::Null; size],
        }
    }

    /// Returns the values in position order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Returns the value at `pos`.
    #[must_use]
    pub fn get(&self, pos: usize) -> Option<&Value> {
        self.values.get(pos)
    }

    /// Sets the value at `pos`, growing the tuple with nulls if needed.
    pub fn set(&mut self, pos: usize, value: Value) {
        if pos >= self.values.len() {
            self.values.resize(pos + 1, Value::Null);
        }
        self.values[pos] = value;
    }

    /// Appends a value.
    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Appends every value from `iter`.
    pub fn extend<I: IntoIterator<Item = Value>>(&mut self, iter: I) {
        self.values.extend(iter);
    }

    /// Removes all values, keeping the allocation.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the tuple has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<Value>> for Tuple {
    fn from(values: Vec<Value>) -> Self {
        Self { values }
    }
}

impl FromIterator<Value> for Tuple {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// A tuple viewed through a field set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TupleEntry {
    fields: FieldSet,
    tuple: Tuple,
}

impl TupleEntry {
    /// Creates an entry sized to the field set (all nulls when defined,
    /// empty otherwise).
    #[must_use]
    pub fn new(fields: FieldSet) -> Self {
        let tuple = Tuple::with_size(fields.size());
        Self { fields, tuple }
    }

    /// Creates an entry around an existing tuple.
    #[must_use]
    pub fn with_tuple(fields: FieldSet, tuple: Tuple) -> Self {
        Self { fields, tuple }
    }

    /// Returns the field set.
    #[must_use]
    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    /// Returns the tuple.
    #[must_use]
    pub fn tuple(&self) -> &Tuple {
        &self.tuple
    }

    /// Returns the tuple for in-place mutation.
    pub fn tuple_mut(&mut self) -> &mut Tuple {
        &mut self.tuple
    }

    /// Splits the entry into its field set and a mutable tuple.
    pub fn parts_mut(&mut self) -> (&FieldSet, &mut Tuple) {
        (&self.fields, &mut self.tuple)
    }

    /// Returns the value addressed by `field`, if the field is declared.
    #[must_use]
    pub fn get(&self, field: &FieldId) -> Option<&Value> {
        self.fields
            .position_of(field)
            .and_then(|pos| self.tuple.get(pos))
    }

    /// Sets the value addressed by `field`.
    ///
    /// Returns `false` when the field is not part of a defined field set.
    pub fn set(&mut self, field: &FieldId, value: Value) -> bool {
        match self.fields.position_of(field) {
            Some(pos) => {
                self.tuple.set(pos, value);
                true
            }
            None => false,
        }
    }

    /// Resets the entry for the next record.
    ///
    /// Defined entries are refilled with nulls; undefined entries are
    /// emptied so values can be appended.
    pub fn reset(&mut self) {
        self.tuple.clear();
        self.tuple
            .extend(std::iter::repeat(Value::Null).take(self.fields.size()));
    }
}
