//! Value reader/writer framework.
//!
//! The adapter never encodes field values itself. Instead it carries a
//! reader and a writer, registered as typed factories in the job
//! [`Settings`](crate::config::Settings):
//!
//! - [`ValueReader`]: Decodes raw store bytes into a [`Document`]
//! - [`ValueWriter`]: Encodes an outgoing [`TupleEntry`] as a [`Document`]
//!
//! ## Implementations
//!
//! - [`json`]: JSON documents using `serde_json`

pub mod json;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::SerdeError;
use crate::tuple::{Document, TupleEntry};

/// Trait for decoding raw store records into documents.
pub trait ValueReader: Send + Sync {
    /// Decodes `data` into `into`, replacing its previous contents.
    ///
    /// Implementations should reuse the allocation held by `into`.
    ///
    /// # Errors
    ///
    /// Returns `SerdeError` if the input cannot be parsed or is not a
    /// document.
    fn read(&self, data: &[u8], into: &mut Document) -> Result<(), SerdeError>;

    /// Identifier under which this reader is registered by default.
    fn name(&self) -> &'static str;
}

/// Trait for encoding outgoing tuples as store documents.
pub trait ValueWriter: Send + Sync {
    /// Builds a document from `entry`, naming values after `names`.
    ///
    /// An empty `names` slice means the writer picks the names itself.
    ///
    /// # Errors
    ///
    /// Returns `SerdeError` if the tuple cannot be represented.
    fn write(&self, entry: &TupleEntry, names: &[String]) -> Result<Document, SerdeError>;

    /// Encodes `entry` straight to bytes.
    ///
    /// # Errors
    ///
    /// Returns `SerdeError` if building or encoding the document fails.
    fn write_bytes(&self, entry: &TupleEntry, names: &[String]) -> Result<Vec<u8>, SerdeError> {
        let doc = self.write(entry, names)?;
        Ok(serde_json::to_vec(&Value::Object(doc))?)
    }

    /// Identifier under which this writer is registered by default.
    fn name(&self) -> &'static str;
}

/// Factory function type for creating value readers.
pub type ValueReaderFactory = Arc<dyn Fn() -> Box<dyn ValueReader> + Send + Sync>;

/// Factory function type for creating value writers.
pub type ValueWriterFactory = Arc<dyn Fn() -> Box<dyn ValueWriter> + Send + Sync>;

/// A named factory stored in the settings.
#[derive(Clone)]
pub struct Registration<F> {
    name: String,
    factory: F,
}

impl<F> Registration<F> {
    /// Creates a registration.
    #[must_use]
    pub fn new(name: impl Into<String>, factory: F) -> Self {
        Self {
            name: name.into(),
            factory,
        }
    }

    /// Returns the registered identifier.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the factory.
    #[must_use]
    pub fn factory(&self) -> &F {
        &self.factory
    }
}

impl<F> fmt::Debug for Registration<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::json::{JsonValueReader, TupleValueWriter};
    use super::*;
    use crate::fields::FieldSet;
    use crate::tuple::Tuple;
    use serde_json::json;

    #[test]
    fn test_registration_creates_fresh_instances() {
        let reg = Registration::new("json", JsonValueReader::factory());
        let a = (reg.factory())();
        let b = (reg.factory())();
        assert_eq!(a.name(), b.name());
        assert_eq!(reg.name(), "json");
    }

    #[test]
    fn test_default_write_bytes() {
        let writer = TupleValueWriter::new();
        let entry = TupleEntry::with_tuple(
            FieldSet::defined(["id"]),
            Tuple::from(vec![json!(7)]),
        );
        let bytes = writer.write_bytes(&entry, &["id".to_string()]).unwrap();
        assert_eq!(bytes, br#"{"id":7}"#);
    }

    #[test]
    fn test_registration_debug() {
        let reg = Registration::new("tuple", TupleValueWriter::factory());
        assert!(format!("{reg:?}").contains("tuple"));
    }
}
