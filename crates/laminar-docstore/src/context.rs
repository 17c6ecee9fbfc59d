//! Per-split state.
//!
//! Each split owns one call object for its whole lifetime:
//! [`SourceCall`] for a reading split, [`SinkCall`] for a writing one.
//! The call carries the injected collaborator, the tuple entry exchanged
//! with the pipeline, the settings snapshot, and the split context that
//! exists only between prepare and cleanup.

use std::fmt;
use std::sync::Arc;

use crate::config::Settings;
use crate::connector::{Collector, RecordCursor};
use crate::fields::FieldSet;
use crate::tuple::{Document, Tuple, TupleEntry};

/// Lifecycle state of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitState {
    /// Created, not yet prepared.
    Unprepared,

    /// Context allocated; steps may run.
    Prepared,

    /// The cursor signalled the end of the split.
    Exhausted,

    /// Context released.
    Cleaned,
}

impl fmt::Display for SplitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitState::Unprepared => write!(f, "Unprepared"),
            SplitState::Prepared => write!(f, "Prepared"),
            SplitState::Exhausted => write!(f, "Exhausted"),
            SplitState::Cleaned => write!(f, "Cleaned"),
        }
    }
}

/// Read context: the reusable key and value holders.
///
/// Both holders come from the cursor once, at prepare time, and are
/// refilled in place by every read step.
#[derive(Debug)]
pub struct SourceContext<K> {
    /// Key holder.
    pub key: K,

    /// Value holder.
    pub value: Document,

    /// Scratch buffer for field lookup keys.
    pub(crate) lookup_key: String,
}

impl<K> SourceContext<K> {
    /// Creates a read context around the given holders.
    #[must_use]
    pub fn new(key: K, value: Document) -> Self {
        Self {
            key,
            value,
            lookup_key: String::new(),
        }
    }
}

/// Write context: the resolved output field names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SinkContext {
    names: Vec<String>,
}

impl SinkContext {
    /// Creates a write context.
    #[must_use]
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Resolved output names; empty means the writer picks names.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// State of one reading split.
pub struct SourceCall<C: RecordCursor> {
    pub(crate) input: C,
    pub(crate) incoming: TupleEntry,
    pub(crate) settings: Arc<Settings>,
    pub(crate) context: Option<SourceContext<C::Key>>,
    pub(crate) state: SplitState,
}

impl<C: RecordCursor> SourceCall<C> {
    /// Creates a call that reads from `input` into tuples shaped by `fields`.
    #[must_use]
    pub fn new(input: C, fields: FieldSet, settings: Arc<Settings>) -> Self {
        Self {
            input,
            incoming: TupleEntry::new(fields),
            settings,
            context: None,
            state: SplitState::Unprepared,
        }
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> SplitState {
        self.state
    }

    /// Returns the settings snapshot.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the split context, if prepared.
    #[must_use]
    pub fn context(&self) -> Option<&SourceContext<C::Key>> {
        self.context.as_ref()
    }

    /// Returns the entry populated by read steps.
    #[must_use]
    pub fn incoming(&self) -> &TupleEntry {
        &self.incoming
    }

    /// Returns the entry populated by read steps, mutably.
    pub fn incoming_mut(&mut self) -> &mut TupleEntry {
        &mut self.incoming
    }

    /// Returns the cursor.
    #[must_use]
    pub fn input(&self) -> &C {
        &self.input
    }

    /// Consumes the call, returning the cursor.
    #[must_use]
    pub fn into_input(self) -> C {
        self.input
    }
}

impl<C: RecordCursor> fmt::Debug for SourceCall<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceCall")
            .field("state", &self.state)
            .field("incoming", &self.incoming)
            .field("prepared", &self.context.is_some())
            .finish_non_exhaustive()
    }
}

/// State of one writing split.
pub struct SinkCall<O: Collector> {
    pub(crate) output: O,
    pub(crate) outgoing: TupleEntry,
    pub(crate) settings: Arc<Settings>,
    pub(crate) context: Option<SinkContext>,
    pub(crate) state: SplitState,
}

impl<O: Collector> SinkCall<O> {
    /// Creates a call that writes tuples shaped by `fields` to `output`.
    #[must_use]
    pub fn new(output: O, fields: FieldSet, settings: Arc<Settings>) -> Self {
        Self {
            output,
            outgoing: TupleEntry::new(fields),
            settings,
            context: None,
            state: SplitState::Unprepared,
        }
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> SplitState {
        self.state
    }

    /// Returns the settings snapshot.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the split context, if prepared.
    #[must_use]
    pub fn context(&self) -> Option<&SinkContext> {
        self.context.as_ref()
    }

    /// Returns the entry handed to the collector by write steps.
    #[must_use]
    pub fn outgoing(&self) -> &TupleEntry {
        &self.outgoing
    }

    /// Returns the outgoing entry, mutably.
    pub fn outgoing_mut(&mut self) -> &mut TupleEntry {
        &mut self.outgoing
    }

    /// Replaces the outgoing tuple, keeping the field set.
    pub fn set_outgoing(&mut self, tuple: Tuple) {
        *self.outgoing.tuple_mut() = tuple;
    }

    /// Returns the collector.
    #[must_use]
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Consumes the call, returning the collector.
    #[must_use]
    pub fn into_output(self) -> O {
        self.output
    }
}

impl<O: Collector> fmt::Debug for SinkCall<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkCall")
            .field("state", &self.state)
            .field("outgoing", &self.outgoing)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
