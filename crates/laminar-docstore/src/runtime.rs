//! Split drivers.
//!
//! [`SourceSplit`] and [`SinkSplit`] run a [`Scheme`] through its whole
//! lifecycle for one split: configuration init, prepare, the step loop,
//! and cleanup. They own the per-split call, keep [`SplitMetrics`], and
//! reset the incoming tuple between records the way a pipeline engine
//! would.
//!
//! ```text
//! SourceSplit::open  -> source_conf_init -> source_prepare
//! SourceSplit::next  -> source (repeat; cleanup on exhaustion)
//! SourceSplit::close -> source_cleanup (if still prepared)
//! ```

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{Settings, SharedJobConf};
use crate::connector::{Collector, RecordCursor, Scheme};
use crate::context::{SinkCall, SourceCall, SplitState};
use crate::error::SchemeError;
use crate::fields::FieldSet;
use crate::metrics::SplitMetrics;
use crate::tuple::Tuple;

/// Drives one reading split.
pub struct SourceSplit<S: Scheme, C: RecordCursor> {
    scheme: Arc<S>,
    call: SourceCall<C>,
    metrics: SplitMetrics,
}

impl<S: Scheme, C: RecordCursor> SourceSplit<S, C> {
    /// Configures the job, then prepares a split reading from `cursor`.
    ///
    /// # Errors
    ///
    /// Returns `SchemeError` if configuration or prepare fails.
    pub fn open(scheme: Arc<S>, conf: &SharedJobConf, cursor: C) -> Result<Self, SchemeError> {
        let settings = scheme.source_conf_init(conf)?;
        let fields = scheme.source_fields().clone();
        let mut call = SourceCall::new(cursor, fields, settings);
        scheme.source_prepare(&mut call)?;

        let metrics = SplitMetrics::new();
        metrics.record_prepare();
        debug!("source split opened");
        Ok(Self {
            scheme,
            call,
            metrics,
        })
    }

    /// Reads the next record.
    ///
    /// Returns `Ok(None)` once the split is exhausted; the split is
    /// cleaned up at that point.
    ///
    /// # Errors
    ///
    /// Returns the cursor's error unchanged, or `SchemeError::InvalidState`
    /// if the split was already closed.
    pub fn next(&mut self) -> Result<Option<&Tuple>, SchemeError> {
        if self.call.state() == SplitState::Cleaned {
            return Ok(None);
        }

        self.call.incoming_mut().reset();
        match self.scheme.source(&mut self.call) {
            Ok(true) => {
                self.metrics.record_read();
                Ok(Some(self.call.incoming().tuple()))
            }
            Ok(false) => {
                self.cleanup()?;
                Ok(None)
            }
            Err(e) => {
                self.metrics.record_error();
                warn!(error = %e, "source step failed");
                Err(e)
            }
        }
    }

    /// Reads every remaining record.
    ///
    /// # Errors
    ///
    /// Returns the first read error.
    pub fn read_all(&mut self) -> Result<Vec<Tuple>, SchemeError> {
        let mut tuples = Vec::new();
        while let Some(tuple) = self.next()? {
            tuples.push(tuple.clone());
        }
        Ok(tuples)
    }

    /// Cleans up the split if needed and returns the cursor.
    ///
    /// # Errors
    ///
    /// Returns `SchemeError` if cleanup fails.
    pub fn close(mut self) -> Result<C, SchemeError> {
        if self.call.state() != SplitState::Cleaned {
            self.cleanup()?;
        }
        Ok(self.call.into_input())
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> SplitState {
        self.call.state()
    }

    /// Returns the settings snapshot.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        self.call.settings()
    }

    /// Returns the split metrics.
    #[must_use]
    pub fn metrics(&self) -> &SplitMetrics {
        &self.metrics
    }

    fn cleanup(&mut self) -> Result<(), SchemeError> {
        self.scheme.source_cleanup(&mut self.call)?;
        self.metrics.record_cleanup();
        debug!(
            records = self.metrics.snapshot().records_read,
            "source split closed"
        );
        Ok(())
    }
}

/// Drives one writing split.
pub struct SinkSplit<S: Scheme, O: Collector> {
    scheme: Arc<S>,
    call: SinkCall<O>,
    metrics: SplitMetrics,
}

impl<S: Scheme, O: Collector> SinkSplit<S, O> {
    /// Configures the job, then prepares a split writing tuples shaped by
    /// `fields` to `collector`.
    ///
    /// # Errors
    ///
    /// Returns `SchemeError` if configuration or prepare fails.
    pub fn open(
        scheme: Arc<S>,
        conf: &SharedJobConf,
        collector: O,
        fields: FieldSet,
    ) -> Result<Self, SchemeError> {
        let settings = scheme.sink_conf_init(conf)?;
        let mut call = SinkCall::new(collector, fields, settings);
        scheme.sink_prepare(&mut call)?;

        let metrics = SplitMetrics::new();
        metrics.record_prepare();
        debug!("sink split opened");
        Ok(Self {
            scheme,
            call,
            metrics,
        })
    }

    /// Writes one tuple.
    ///
    /// # Errors
    ///
    /// Returns the collector's error unchanged, or
    /// `SchemeError::InvalidState` if the split is closed.
    pub fn write(&mut self, tuple: Tuple) -> Result<(), SchemeError> {
        self.call.set_outgoing(tuple);
        match self.scheme.sink(&mut self.call) {
            Ok(()) => {
                self.metrics.record_write();
                Ok(())
            }
            Err(e) => {
                self.metrics.record_error();
                warn!(error = %e, "sink step failed");
                Err(e)
            }
        }
    }

    /// Writes every tuple in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first write error.
    pub fn write_all<I>(&mut self, tuples: I) -> Result<(), SchemeError>
    where
        I: IntoIterator<Item = Tuple>,
    {
        tuples.into_iter().try_for_each(|t| self.write(t))
    }

    /// Cleans up the split and returns the collector.
    ///
    /// # Errors
    ///
    /// Returns `SchemeError` if cleanup fails.
    pub fn close(mut self) -> Result<O, SchemeError> {
        self.scheme.sink_cleanup(&mut self.call)?;
        self.metrics.record_cleanup();
        debug!(
            records = self.metrics.snapshot().records_written,
            "sink split closed"
        );
        Ok(self.call.into_output())
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> SplitState {
        self.call.state()
    }

    /// Returns the settings snapshot.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        self.call.settings()
    }

    /// Returns the split metrics.
    #[must_use]
    pub fn metrics(&self) -> &SplitMetrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JobConf;
    use crate::scheme::DocumentScheme;
    use crate::testing::{
        document, mock_documents, FailingCollector, FailingCursor, MemoryCollector, MemoryCursor,
    };
    use serde_json::json;

    fn scheme(fields: Option<FieldSet>) -> Arc<DocumentScheme> {
        Arc::new(DocumentScheme::new("localhost", 9200, "books", fields))
    }

    #[test]
    fn test_source_split_reads_until_exhausted() {
        let conf = JobConf::new().into_shared();
        let cursor = MemoryCursor::new(mock_documents(3));
        let mut split =
            SourceSplit::open(scheme(Some(FieldSet::defined(["name", "id"]))), &conf, cursor)
                .unwrap();

        let tuples = split.read_all().unwrap();
        assert_eq!(tuples.len(), 3);
        assert_eq!(tuples[1].values(), &[json!("name_1"), json!(1)]);
        assert_eq!(split.state(), SplitState::Cleaned);

        // Reads after exhaustion stay terminal.
        assert!(split.next().unwrap().is_none());

        let snap = split.metrics().snapshot();
        assert_eq!(snap.records_read, 3);
        assert_eq!(snap.prepares_total, 1);
        assert_eq!(snap.cleanups_total, 1);

        let cursor = split.close().unwrap();
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_source_split_resets_undefined_tuples() {
        let conf = JobConf::new().into_shared();
        let cursor = MemoryCursor::new(vec![
            document(json!({"a": 1, "b": 2})),
            document(json!({"c": 3})),
        ]);
        let mut split = SourceSplit::open(scheme(None), &conf, cursor).unwrap();

        assert_eq!(split.next().unwrap().unwrap().values(), &[json!(1), json!(2)]);
        assert_eq!(split.next().unwrap().unwrap().values(), &[json!(3)]);
    }

    #[test]
    fn test_source_split_counts_errors() {
        let conf = JobConf::new().into_shared();
        let mut split = SourceSplit::open(scheme(None), &conf, FailingCursor::after(1)).unwrap();

        assert!(split.next().unwrap().is_some());
        assert!(matches!(split.next(), Err(SchemeError::ReadError(_))));
        assert_eq!(split.metrics().snapshot().errors_total, 1);

        assert!(split.close().is_ok());
    }

    #[test]
    fn test_source_split_close_before_exhaustion() {
        let conf = JobConf::new().into_shared();
        let cursor = MemoryCursor::new(mock_documents(5));
        let mut split = SourceSplit::open(scheme(None), &conf, cursor).unwrap();
        assert!(split.next().unwrap().is_some());

        let cursor = split.close().unwrap();
        assert_eq!(cursor.remaining(), 4);
    }

    #[test]
    fn test_source_split_open_rejects_bad_target() {
        let conf = JobConf::new().into_shared();
        let bad = Arc::new(DocumentScheme::new("", 9200, "books", None));
        let result = SourceSplit::open(bad, &conf, MemoryCursor::new(vec![]));
        assert!(matches!(result, Err(SchemeError::MissingConfig(_))));
    }

    #[test]
    fn test_sink_split_writes_in_order() {
        let conf = JobConf::new().into_shared();
        let mut split = SinkSplit::open(
            scheme(None),
            &conf,
            MemoryCollector::new(),
            FieldSet::defined(["id", "name"]),
        )
        .unwrap();

        split
            .write_all((0..3).map(|i| Tuple::from(vec![json!(i), json!(format!("n{i}"))])))
            .unwrap();
        assert_eq!(split.metrics().snapshot().records_written, 3);

        let collector = split.close().unwrap();
        assert_eq!(collector.len(), 3);
        assert_eq!(
            serde_json::Value::Object(collector.documents()[2].clone()),
            json!({"id": 2, "name": "n2"})
        );
    }

    #[test]
    fn test_sink_split_stops_at_first_failure() {
        let conf = JobConf::new().into_shared();
        let mut split =
            SinkSplit::open(scheme(None), &conf, FailingCollector::after(2), FieldSet::Unknown)
                .unwrap();

        let tuples = (0..5).map(|i| Tuple::from(vec![json!(i)]));
        assert!(matches!(
            split.write_all(tuples),
            Err(SchemeError::WriteError(_))
        ));

        let snap = split.metrics().snapshot();
        assert_eq!(snap.records_written, 2);
        assert_eq!(snap.errors_total, 1);
        assert_eq!(split.close().unwrap().accepted(), 2);
    }

    #[test]
    fn test_sink_split_publishes_settings() {
        let conf = JobConf::new().into_shared();
        let split = SinkSplit::open(
            scheme(Some(FieldSet::defined(["id"]))),
            &conf,
            MemoryCollector::new(),
            FieldSet::Unknown,
        )
        .unwrap();

        assert_eq!(split.settings().target_fields(), vec!["id"]);
        assert_eq!(split.state(), SplitState::Prepared);
        assert_eq!(conf.read().output_dir.as_deref(), Some("books"));
    }
}
