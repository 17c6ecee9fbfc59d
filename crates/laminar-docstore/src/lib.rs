//! # `LaminarDB` Document Store Scheme
//!
//! Adapter between a pipeline engine's tuple model and a document store's
//! record model. A pipeline reads a split of documents into tuples, or
//! writes tuples out as documents, through a [`Scheme`].
//!
//! ## Modules
//!
//! - [`connector`] - Core traits (`Scheme`, `RecordCursor`, `Collector`)
//! - [`scheme`] - The document store scheme
//! - [`init`] - One-time job configuration
//! - [`serde`] - Value reader/writer framework (JSON, tuple)
//! - [`runtime`] - Split drivers
//! - [`testing`] - In-memory cursors, collectors and helpers
//!
//! ## Architecture
//!
//! ```text
//! conf_init:  Scheme -> ConfigInitializer -> JobConf (locked) -> Arc<Settings>
//!
//! Read split:
//!   RecordCursor(next) -> Document -> source() -> TupleEntry -> pipeline
//!
//! Write split:
//!   pipeline -> TupleEntry -> sink() -> Collector(collect) -> store
//! ```
//!
//! Splits are independent and synchronous. The only state shared between
//! them is the job configuration, guarded by a lock during init.

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
// Common test patterns that are acceptable
#![cfg_attr(
    test,
    allow(
        clippy::field_reassign_with_default,
        clippy::manual_let_else,
        clippy::needless_return,
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss,
        unused_mut
    )
)]

/// Scheme error types.
pub mod error;

/// Adapter and job configuration.
pub mod config;

/// Field identifiers and field sets.
pub mod fields;

/// Tuples and tuple entries.
pub mod tuple;

/// Core adapter traits (`Scheme`, `RecordCursor`, `Collector`).
pub mod connector;

/// Per-split call and context types.
pub mod context;

/// One-time job configuration.
pub mod init;

/// Document store scheme.
pub mod scheme;

/// Value reader and writer framework.
pub mod serde;

/// Split metrics.
pub mod metrics;

/// Split drivers.
pub mod runtime;

/// Testing utilities (in-memory cursors and collectors, helpers).
pub mod testing;

pub use config::{JobConf, Settings, SharedJobConf};
pub use connector::{Collector, RecordCursor, Scheme};
pub use context::{SinkCall, SinkContext, SourceCall, SourceContext, SplitState};
pub use error::{SchemeError, SerdeError};
pub use fields::{resolve_names, FieldId, FieldSet};
pub use init::ConfigInitializer;
pub use scheme::DocumentScheme;
pub use tuple::{Document, Tuple, TupleEntry, Value};
