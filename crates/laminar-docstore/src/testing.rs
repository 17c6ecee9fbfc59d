//! Testing utilities for scheme implementations.
//!
//! Provides in-memory cursors and collectors plus helpers for building
//! documents, used by the crate's own tests and by downstream engines
//! exercising a [`Scheme`](crate::connector::Scheme) without a live store.

use std::cell::Cell;
use std::fmt;

use crate::connector::{Collector, RecordCursor};
use crate::context::SinkContext;
use crate::error::SchemeError;
use crate::serde::json::TupleValueWriter;
use crate::serde::ValueWriter;
use crate::tuple::{Document, Tuple, TupleEntry, Value};

/// Converts a JSON object literal into a [`Document`].
///
/// # Panics
///
/// Panics if `value` is not a JSON object.
#[must_use]
pub fn document(value: Value) -> Document {
    match value {
        Value::Object(doc) => doc,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Builds `n` documents of the form `{"id": i, "name": "name_i"}`.
#[must_use]
pub fn mock_documents(n: usize) -> Vec<Document> {
    (0..n)
        .map(|i| {
            let mut doc = Document::new();
            doc.insert("id".into(), Value::from(i));
            doc.insert("name".into(), Value::from(format!("name_{i}")));
            doc
        })
        .collect()
}

/// In-memory record cursor.
///
/// Replays a fixed list of documents. The key is the record's position.
#[derive(Debug)]
pub struct MemoryCursor {
    documents: Vec<Document>,
    position: usize,
    calls: usize,
    holders_created: Cell<usize>,
}

impl MemoryCursor {
    /// Creates a cursor over `documents`.
    #[must_use]
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents,
            position: 0,
            calls: 0,
            holders_created: Cell::new(0),
        }
    }

    /// Number of `next` calls so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Number of key and value holders handed out.
    #[must_use]
    pub fn holders_created(&self) -> usize {
        self.holders_created.get()
    }

    /// Number of documents not yet read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.documents.len() - self.position
    }
}

impl RecordCursor for MemoryCursor {
    type Key = u64;

    fn create_key(&self) -> u64 {
        self.holders_created.set(self.holders_created.get() + 1);
        0
    }

    fn create_value(&self) -> Document {
        self.holders_created.set(self.holders_created.get() + 1);
        Document::new()
    }

    fn next(&mut self, key: &mut u64, value: &mut Document) -> Result<bool, SchemeError> {
        self.calls += 1;
        let Some(doc) = self.documents.get(self.position) else {
            return Ok(false);
        };
        value.clear();
        value.extend(doc.iter().map(|(k, v)| (k.clone(), v.clone())));
        *key = self.position as u64;
        self.position += 1;
        Ok(true)
    }
}

/// Record cursor that fails after a number of records.
#[derive(Debug)]
pub struct FailingCursor {
    remaining: usize,
}

impl FailingCursor {
    /// Creates a cursor that yields `n` empty documents, then fails with
    /// `SchemeError::ReadError("connection reset")`.
    #[must_use]
    pub fn after(n: usize) -> Self {
        Self { remaining: n }
    }
}

impl RecordCursor for FailingCursor {
    type Key = u64;

    fn create_key(&self) -> u64 {
        0
    }

    fn create_value(&self) -> Document {
        Document::new()
    }

    fn next(&mut self, _key: &mut u64, value: &mut Document) -> Result<bool, SchemeError> {
        if self.remaining == 0 {
            return Err(SchemeError::ReadError("connection reset".into()));
        }
        self.remaining -= 1;
        value.clear();
        Ok(true)
    }
}

/// In-memory collector.
///
/// Records every tuple it receives, the names it was given, and the
/// document its value writer built from them.
pub struct MemoryCollector {
    writer: Box<dyn ValueWriter>,
    tuples: Vec<Tuple>,
    names: Vec<Vec<String>>,
    documents: Vec<Document>,
}

impl MemoryCollector {
    /// Creates a collector using the default tuple writer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_writer(Box::new(TupleValueWriter::new()))
    }

    /// Creates a collector using `writer` to build documents.
    #[must_use]
    pub fn with_writer(writer: Box<dyn ValueWriter>) -> Self {
        Self {
            writer,
            tuples: Vec::new(),
            names: Vec::new(),
            documents: Vec::new(),
        }
    }

    /// Number of tuples collected.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    /// Returns `true` if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Collected tuples, in arrival order.
    #[must_use]
    pub fn tuples(&self) -> &[Tuple] {
        &self.tuples
    }

    /// Names passed along with each tuple.
    #[must_use]
    pub fn names(&self) -> &[Vec<String>] {
        &self.names
    }

    /// Documents built from the collected tuples.
    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }
}

impl Default for MemoryCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCollector")
            .field("writer", &self.writer.name())
            .field("collected", &self.tuples.len())
            .finish_non_exhaustive()
    }
}

impl Collector for MemoryCollector {
    fn collect(&mut self, entry: &TupleEntry, context: &SinkContext) -> Result<(), SchemeError> {
        let doc = self.writer.write(entry, context.names())?;
        self.tuples.push(entry.tuple().clone());
        self.names.push(context.names().to_vec());
        self.documents.push(doc);
        Ok(())
    }
}

/// Collector that fails after a number of tuples.
#[derive(Debug)]
pub struct FailingCollector {
    remaining: usize,
    accepted: usize,
}

impl FailingCollector {
    /// Creates a collector that accepts `n` tuples, then fails with
    /// `SchemeError::WriteError("bulk request rejected")`.
    #[must_use]
    pub fn after(n: usize) -> Self {
        Self {
            remaining: n,
            accepted: 0,
        }
    }

    /// Number of tuples accepted before failing.
    #[must_use]
    pub fn accepted(&self) -> usize {
        self.accepted
    }
}

impl Collector for FailingCollector {
    fn collect(&mut self, _entry: &TupleEntry, _context: &SinkContext) -> Result<(), SchemeError> {
        if self.remaining == 0 {
            return Err(SchemeError::WriteError("bulk request rejected".into()));
        }
        self.remaining -= 1;
        self.accepted += 1;
        Ok(())
    }
}
