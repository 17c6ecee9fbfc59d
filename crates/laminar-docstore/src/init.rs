//! One-time job configuration for reading and writing splits.
//!
//! [`ConfigInitializer`] is the only code that mutates the shared
//! [`JobConf`]. It runs before a split is prepared, holds the job lock for
//! the whole update, and hands back an immutable [`Settings`] snapshot.
//! Running it again, from the same or another split, rewrites identical
//! values and leaves existing reader/writer registrations untouched.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{
    InputFormat, JobConf, OutputCommitter, OutputFormat, Settings, SharedJobConf, TARGET_FIELDS,
};
use crate::error::SchemeError;
use crate::fields::{resolve_names, FieldSet};
use crate::serde::json::{JsonValueReader, TupleValueWriter};

/// Publishes the connection target and serde defaults into a job.
#[derive(Debug, Clone, Copy)]
pub struct ConfigInitializer<'a> {
    hosts: &'a str,
    port: u16,
    resource: &'a str,
}

impl<'a> ConfigInitializer<'a> {
    /// Creates an initializer for the given target.
    #[must_use]
    pub fn new(hosts: &'a str, port: u16, resource: &'a str) -> Self {
        Self {
            hosts,
            port,
            resource,
        }
    }

    /// Configures `conf` for a reading split.
    ///
    /// Binds the document input format and publishes the resolved
    /// `source_fields` names.
    ///
    /// # Errors
    ///
    /// Returns `SchemeError` if the target is invalid. `conf` is left
    /// untouched in that case.
    pub fn init_source(
        &self,
        conf: &SharedJobConf,
        source_fields: &FieldSet,
    ) -> Result<Arc<Settings>, SchemeError> {
        self.validate()?;
        let mut conf = conf.write();
        self.init_target(&mut conf);
        conf.input_format = Some(InputFormat::Document);
        publish_fields(&mut conf.settings, source_fields);
        register_defaults(&mut conf.settings);

        info!(
            hosts = self.hosts,
            port = self.port,
            resource = self.resource,
            "document source configured"
        );
        Ok(Arc::new(conf.settings.clone()))
    }

    /// Configures `conf` for a writing split.
    ///
    /// Binds the document output format and committer, sets the output
    /// directory marker to the target resource, and publishes the
    /// resolved `sink_fields` names.
    ///
    /// # Errors
    ///
    /// Returns `SchemeError` if the target is invalid. `conf` is left
    /// untouched in that case.
    pub fn init_sink(
        &self,
        conf: &SharedJobConf,
        sink_fields: &FieldSet,
    ) -> Result<Arc<Settings>, SchemeError> {
        self.validate()?;
        let mut conf = conf.write();
        self.init_target(&mut conf);
        conf.output_format = Some(OutputFormat::Document);
        publish_fields(&mut conf.settings, sink_fields);
        register_defaults(&mut conf.settings);

        // A URI here confuses the job framework; the bare resource is enough.
        conf.output_dir = Some(self.resource.to_string());
        conf.output_committer = Some(OutputCommitter::Document);

        info!(
            hosts = self.hosts,
            port = self.port,
            resource = self.resource,
            "document sink configured"
        );
        Ok(Arc::new(conf.settings.clone()))
    }

    fn init_target(&self, conf: &mut JobConf) {
        conf.settings.set_target(self.hosts, self.port, self.resource);
    }

    fn validate(&self) -> Result<(), SchemeError> {
        let mut probe = Settings::new();
        probe.set_target(self.hosts, self.port, self.resource);
        probe.validate_target()
    }
}

fn publish_fields(settings: &mut Settings, fields: &FieldSet) {
    settings.set(TARGET_FIELDS, resolve_names(Some(fields)).join(","));
}

/// Registers the default value reader and writer where none is set.
///
/// Returns whether the reader and the writer, respectively, were newly
/// registered.
pub fn register_defaults(settings: &mut Settings) -> (bool, bool) {
    let reader =
        settings.set_value_reader_if_absent(JsonValueReader::NAME, JsonValueReader::factory());
    if reader {
        debug!(reader = JsonValueReader::NAME, "registered default value reader");
    } else {
        debug!(
            reader = settings.value_reader_name().unwrap_or_default(),
            "keeping registered value reader"
        );
    }

    let writer =
        settings.set_value_writer_if_absent(TupleValueWriter::NAME, TupleValueWriter::factory());
    if writer {
        debug!(writer = TupleValueWriter::NAME, "registered default value writer");
    } else {
        debug!(
            writer = settings.value_writer_name().unwrap_or_default(),
            "keeping registered value writer"
        );
    }

    (reader, writer)
}
