//! JSON value reader and tuple value writer.
//!
//! Converts between raw JSON documents and the adapter's
//! [`Document`]/[`TupleEntry`] model using `serde_json`.

use std::sync::Arc;

use serde_json::Value;

use super::{ValueReader, ValueReaderFactory, ValueWriter, ValueWriterFactory};
use crate::error::SerdeError;
use crate::tuple::{Document, TupleEntry};

/// JSON document reader.
///
/// Parses a JSON object and keeps its keys in source order.
#[derive(Debug, Clone)]
pub struct JsonValueReader {
    _private: (),
}

impl JsonValueReader {
    /// Identifier used when registered as the default reader.
    pub const NAME: &'static str = "json";

    /// Creates a new JSON reader.
    #[must_use]
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Returns a factory producing JSON readers.
    #[must_use]
    pub fn factory() -> ValueReaderFactory {
        Arc::new(|| Box::new(JsonValueReader::new()))
    }
}

impl Default for JsonValueReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueReader for JsonValueReader {
    fn read(&self, data: &[u8], into: &mut Document) -> Result<(), SerdeError> {
        let value: Value = serde_json::from_slice(data)?;
        let Value::Object(obj) = value else {
            return Err(SerdeError::MalformedInput("expected JSON object".into()));
        };
        into.clear();
        into.extend(obj);
        Ok(())
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

/// Tuple-to-document writer.
///
/// Pairs resolved names with tuple values by position. With no resolved
/// names, values are named `_0`, `_1`, ... in tuple order.
#[derive(Debug, Clone)]
pub struct TupleValueWriter {
    _private: (),
}

impl TupleValueWriter {
    /// Identifier used when registered as the default writer.
    pub const NAME: &'static str = "tuple";

    /// Creates a new tuple writer.
    #[must_use]
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Returns a factory producing tuple writers.
    #[must_use]
    pub fn factory() -> ValueWriterFactory {
        Arc::new(|| Box::new(TupleValueWriter::new()))
    }
}

impl Default for TupleValueWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueWriter for TupleValueWriter {
    fn write(&self, entry: &TupleEntry, names: &[String]) -> Result<Document, SerdeError> {
        let values = entry.tuple().values();
        let mut doc = Document::new();

        if names.is_empty() {
            for (pos, value) in values.iter().enumerate() {
                doc.insert(format!("_{pos}"), value.clone());
            }
            return Ok(doc);
        }

        if values.len() > names.len() {
            return Err(SerdeError::FieldCountMismatch {
                names: names.len(),
                values: values.len(),
            });
        }

        // Missing trailing values are written as nulls.
        for (pos, name) in names.iter().enumerate() {
            let value = values.get(pos).cloned().unwrap_or(Value::Null);
            doc.insert(name.clone(), value);
        }
        Ok(doc)
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldSet;
    use crate::tuple::Tuple;
    use serde_json::json;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_read_object_in_order() {
        let reader = JsonValueReader::new();
        let mut doc = Document::new();
        reader.read(br#"{"b":2,"a":1}"#, &mut doc).unwrap();
        let values: Vec<&Value> = doc.values().collect();
        assert_eq!(values, vec![&json!(2), &json!(1)]);
    }

    #[test]
    fn test_read_replaces_previous_contents() {
        let reader = JsonValueReader::new();
        let mut doc = Document::new();
        reader.read(br#"{"old":true}"#, &mut doc).unwrap();
        reader.read(br#"{"new":1}"#, &mut doc).unwrap();
        assert!(doc.get("old").is_none());
        assert_eq!(doc.get("new"), Some(&json!(1)));
    }

    #[test]
    fn test_read_rejects_non_object() {
        let reader = JsonValueReader::new();
        let mut doc = Document::new();
        let err = reader.read(b"[1,2]", &mut doc).unwrap_err();
        assert!(matches!(err, SerdeError::MalformedInput(_)));
        assert!(matches!(
            reader.read(b"{oops", &mut doc),
            Err(SerdeError::Json(_))
        ));
    }

    #[test]
    fn test_write_with_names() {
        let writer = TupleValueWriter::new();
        let entry = TupleEntry::with_tuple(
            FieldSet::defined(["id", "name"]),
            Tuple::from(vec![json!(1), json!("ada")]),
        );
        let doc = writer.write(&entry, &names(&["id", "name"])).unwrap();
        assert_eq!(Value::Object(doc), json!({"id": 1, "name": "ada"}));
    }

    #[test]
    fn test_write_auto_names() {
        let writer = TupleValueWriter::new();
        let entry = TupleEntry::with_tuple(
            FieldSet::Unknown,
            Tuple::from(vec![json!("x"), json!(false)]),
        );
        let doc = writer.write(&entry, &[]).unwrap();
        let keys: Vec<&str> = doc.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["_0", "_1"]);
    }

    #[test]
    fn test_write_pads_missing_values() {
        let writer = TupleValueWriter::new();
        let entry = TupleEntry::with_tuple(FieldSet::Unknown, Tuple::from(vec![json!(1)]));
        let doc = writer.write(&entry, &names(&["a", "b"])).unwrap();
        assert_eq!(doc.get("b"), Some(&Value::Null));
    }

    #[test]
    fn test_write_rejects_extra_values() {
        let writer = TupleValueWriter::new();
        let entry = TupleEntry::with_tuple(
            FieldSet::Unknown,
            Tuple::from(vec![json!(1), json!(2)]),
        );
        let err = writer.write(&entry, &names(&["a"])).unwrap_err();
        assert!(matches!(
            err,
            SerdeError::FieldCountMismatch {
                names: 1,
                values: 2
            }
        ));
    }
}
