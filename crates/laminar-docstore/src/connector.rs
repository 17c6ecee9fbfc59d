//! Core adapter traits.
//!
//! Defines the injected collaborators and the interface a pipeline engine
//! drives for each split:
//! - `RecordCursor`: Produces documents from the store, one per step
//! - `Collector`: Accepts outgoing tuples for transmission to the store
//! - `Scheme`: Configuration hooks plus the source/sink lifecycle
//!
//! Everything here is synchronous. A split runs on exactly one task and
//! the adapter never suspends.

use std::sync::Arc;

use crate::config::{Settings, SharedJobConf};
use crate::context::{SinkCall, SinkContext, SourceCall};
use crate::error::SchemeError;
use crate::fields::FieldSet;
use crate::tuple::{Document, TupleEntry};

/// Read side of the store transport.
///
/// The cursor hands out reusable holders once per split and then refills
/// them in place on every [`next`](RecordCursor::next) call.
pub trait RecordCursor {
    /// Holder for the record key (document id, offset, ...).
    type Key;

    /// Creates the key holder for a split.
    fn create_key(&self) -> Self::Key;

    /// Creates the value holder for a split.
    fn create_value(&self) -> Document;

    /// Loads the next record into `key` and `value`.
    ///
    /// Returns `Ok(false)` once the split is exhausted.
    ///
    /// # Errors
    ///
    /// Returns `SchemeError` on transport or decode failure. The adapter
    /// propagates it unchanged.
    fn next(&mut self, key: &mut Self::Key, value: &mut Document) -> Result<bool, SchemeError>;
}

/// Write side of the store transport.
pub trait Collector {
    /// Builds and sends the document for `entry`.
    ///
    /// `context` carries the resolved output names; an empty list means
    /// the collector chooses names itself.
    ///
    /// # Errors
    ///
    /// Returns `SchemeError` on transport failure. The adapter propagates
    /// it unchanged.
    fn collect(&mut self, entry: &TupleEntry, context: &SinkContext) -> Result<(), SchemeError>;
}

impl<C: RecordCursor + ?Sized> RecordCursor for Box<C> {
    type Key = C::Key;

    fn create_key(&self) -> Self::Key {
        (**self).create_key()
    }

    fn create_value(&self) -> Document {
        (**self).create_value()
    }

    fn next(&mut self, key: &mut Self::Key, value: &mut Document) -> Result<bool, SchemeError> {
        (**self).next(key, value)
    }
}

impl<O: Collector + ?Sized> Collector for Box<O> {
    fn collect(&mut self, entry: &TupleEntry, context: &SinkContext) -> Result<(), SchemeError> {
        (**self).collect(entry, context)
    }
}

/// The interface a pipeline engine drives to read or write one split.
///
/// A split is either reading or writing, never both. Configuration
/// initialization runs first and yields the immutable [`Settings`]
/// snapshot the split's call carries.
///
/// # Lifecycle
///
/// 1. `source_conf_init()` / `sink_conf_init()` - Publish job settings
/// 2. `source_prepare()` / `sink_prepare()` - Create the split context
/// 3. `source()` until it returns `false` / `sink()` once per tuple
/// 4. `source_cleanup()` / `sink_cleanup()` - Release the context
pub trait Scheme {
    /// Fields produced when reading.
    fn source_fields(&self) -> &FieldSet;

    /// Fields expected when writing.
    fn sink_fields(&self) -> &FieldSet;

    /// Configures `conf` for reading and returns the settings snapshot.
    ///
    /// # Errors
    ///
    /// Returns `SchemeError` if the connection target is invalid.
    fn source_conf_init(&self, conf: &SharedJobConf) -> Result<Arc<Settings>, SchemeError>;

    /// Configures `conf` for writing and returns the settings snapshot.
    ///
    /// # Errors
    ///
    /// Returns `SchemeError` if the connection target is invalid.
    fn sink_conf_init(&self, conf: &SharedJobConf) -> Result<Arc<Settings>, SchemeError>;

    /// Creates the read context of a split.
    ///
    /// # Errors
    ///
    /// Returns `SchemeError` if the split was already prepared or its
    /// settings are unusable.
    fn source_prepare<C: RecordCursor>(&self, call: &mut SourceCall<C>)
        -> Result<(), SchemeError>;

    /// Reads the next record into the call's incoming entry.
    ///
    /// Returns `Ok(false)` once the cursor is exhausted.
    ///
    /// # Errors
    ///
    /// Returns `SchemeError` if the split is not prepared, or whatever the
    /// cursor raised.
    fn source<C: RecordCursor>(&self, call: &mut SourceCall<C>) -> Result<bool, SchemeError>;

    /// Releases the read context of a split.
    ///
    /// # Errors
    ///
    /// Implementations may reject cleanup in an invalid state.
    fn source_cleanup<C: RecordCursor>(&self, call: &mut SourceCall<C>)
        -> Result<(), SchemeError>;

    /// Creates the write context of a split.
    ///
    /// # Errors
    ///
    /// Returns `SchemeError` if the split was already prepared or its
    /// settings are unusable.
    fn sink_prepare<O: Collector>(&self, call: &mut SinkCall<O>) -> Result<(), SchemeError>;

    /// Hands the call's outgoing entry to the collector.
    ///
    /// # Errors
    ///
    /// Returns `SchemeError` if the split is not prepared, or whatever the
    /// collector raised.
    fn sink<O: Collector>(&self, call: &mut SinkCall<O>) -> Result<(), SchemeError>;

    /// Releases the write context of a split.
    ///
    /// # Errors
    ///
    /// Implementations may reject cleanup in an invalid state.
    fn sink_cleanup<O: Collector>(&self, call: &mut SinkCall<O>) -> Result<(), SchemeError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{document, MemoryCollector, MemoryCursor};
    use serde_json::json;

    #[test]
    fn test_boxed_cursor_delegates() {
        let mut cursor: Box<MemoryCursor> =
            Box::new(MemoryCursor::new(vec![document(json!({"a": 1}))]));
        let mut key = cursor.create_key();
        let mut value = cursor.create_value();
        assert!(cursor.next(&mut key, &mut value).unwrap());
        assert_eq!(value.get("a"), Some(&json!(1)));
        assert!(!cursor.next(&mut key, &mut value).unwrap());
    }

    #[test]
    fn test_boxed_collector_delegates() {
        let mut collector: Box<MemoryCollector> = Box::new(MemoryCollector::new());
        let entry = TupleEntry::new(FieldSet::defined(["a"]));
        let ctx = SinkContext::new(vec!["a".into()]);
        collector.collect(&entry, &ctx).unwrap();
        assert_eq!(collector.len(), 1);
    }
}
