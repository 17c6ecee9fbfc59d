//! Document store scheme.
//!
//! [`DocumentScheme`] translates between store documents and pipeline
//! tuples for one split at a time. It holds only the immutable target
//! description and field sets; all per-split state lives in the
//! [`SourceCall`]/[`SinkCall`] the engine passes in.
//!
//! ## Reading
//!
//! With a defined field set each declared field is looked up in the
//! document by its string form and written to its own position, so tuple
//! order follows the field set, not the document. With an undefined field
//! set the document's values are appended in document order.
//!
//! ## Writing
//!
//! The scheme only resolves output names at prepare time; building and
//! sending the document is up to the injected collector.

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{Settings, SharedJobConf, FIELDS, NODES, RESOURCE};
use crate::connector::{Collector, RecordCursor, Scheme};
use crate::context::{SinkCall, SinkContext, SourceCall, SourceContext, SplitState};
use crate::error::SchemeError;
use crate::fields::{resolve_names, FieldSet};
use crate::init::ConfigInitializer;
use crate::tuple::Value;

/// Reads and writes documents of one store resource.
#[derive(Debug, Clone)]
pub struct DocumentScheme {
    hosts: String,
    port: u16,
    resource: String,
    source_fields: FieldSet,
    sink_fields: FieldSet,
}

impl DocumentScheme {
    /// Creates a scheme for `resource` on `hosts:port`.
    ///
    /// When `fields` is given it becomes both the source and the sink
    /// field set; otherwise both stay [`FieldSet::Unknown`].
    #[must_use]
    pub fn new(
        hosts: impl Into<String>,
        port: u16,
        resource: impl Into<String>,
        fields: Option<FieldSet>,
    ) -> Self {
        let fields = fields.unwrap_or_default();
        Self {
            hosts: hosts.into(),
            port,
            resource: resource.into(),
            source_fields: fields.clone(),
            sink_fields: fields,
        }
    }

    /// Builds a scheme from properties.
    ///
    /// Reads [`NODES`], [`PORT`](crate::config::PORT) (default
    /// [`DEFAULT_PORT`](crate::config::DEFAULT_PORT)), [`RESOURCE`] and
    /// the optional comma-separated [`FIELDS`].
    ///
    /// # Errors
    ///
    /// Returns `SchemeError` if the target is incomplete or the port is
    /// invalid.
    pub fn from_config(settings: &Settings) -> Result<Self, SchemeError> {
        settings.validate_target()?;
        let fields = settings.get(FIELDS).map(FieldSet::parse);
        Ok(Self::new(
            settings.require(NODES)?,
            settings.port()?,
            settings.require(RESOURCE)?,
            fields,
        ))
    }

    /// Overrides the source field set.
    #[must_use]
    pub fn with_source_fields(mut self, fields: FieldSet) -> Self {
        self.source_fields = fields;
        self
    }

    /// Overrides the sink field set.
    #[must_use]
    pub fn with_sink_fields(mut self, fields: FieldSet) -> Self {
        self.sink_fields = fields;
        self
    }

    /// Target host(s).
    #[must_use]
    pub fn hosts(&self) -> &str {
        &self.hosts
    }

    /// Target port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Target resource.
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    fn initializer(&self) -> ConfigInitializer<'_> {
        ConfigInitializer::new(&self.hosts, self.port, &self.resource)
    }
}

fn invalid_state(expected: SplitState, actual: SplitState) -> SchemeError {
    SchemeError::InvalidState {
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}

impl Scheme for DocumentScheme {
    fn source_fields(&self) -> &FieldSet {
        &self.source_fields
    }

    fn sink_fields(&self) -> &FieldSet {
        &self.sink_fields
    }

    fn source_conf_init(&self, conf: &SharedJobConf) -> Result<Arc<Settings>, SchemeError> {
        self.initializer().init_source(conf, &self.source_fields)
    }

    fn sink_conf_init(&self, conf: &SharedJobConf) -> Result<Arc<Settings>, SchemeError> {
        self.initializer().init_sink(conf, &self.sink_fields)
    }

    fn source_prepare<C: RecordCursor>(
        &self,
        call: &mut SourceCall<C>,
    ) -> Result<(), SchemeError> {
        if call.state != SplitState::Unprepared {
            return Err(invalid_state(SplitState::Unprepared, call.state));
        }
        call.settings.validate_target()?;

        let key = call.input.create_key();
        let value = call.input.create_value();
        call.context = Some(SourceContext::new(key, value));
        call.state = SplitState::Prepared;

        debug!(resource = %self.resource, "source split prepared");
        Ok(())
    }

    fn source<C: RecordCursor>(&self, call: &mut SourceCall<C>) -> Result<bool, SchemeError> {
        match call.state {
            SplitState::Prepared => {}
            SplitState::Exhausted => return Ok(false),
            state => return Err(invalid_state(SplitState::Prepared, state)),
        }
        let Some(ctx) = call.context.as_mut() else {
            return Err(invalid_state(SplitState::Prepared, call.state));
        };

        if !call.input.next(&mut ctx.key, &mut ctx.value)? {
            call.state = SplitState::Exhausted;
            debug!(resource = %self.resource, "source split exhausted");
            return Ok(false);
        }

        let (fields, tuple) = call.incoming.parts_mut();
        let data = &ctx.value;

        if fields.is_defined() {
            // Coercion to declared types is left to the pipeline.
            for (pos, field) in fields.fields().iter().enumerate() {
                ctx.lookup_key.clear();
                // Writing to a String cannot fail.
                let _ = write!(ctx.lookup_key, "{field}");
                let value = data
                    .get(ctx.lookup_key.as_str())
                    .cloned()
                    .unwrap_or(Value::Null);
                tuple.set(pos, value);
            }
        } else {
            tuple.extend(data.values().cloned());
        }

        Ok(true)
    }

    fn source_cleanup<C: RecordCursor>(
        &self,
        call: &mut SourceCall<C>,
    ) -> Result<(), SchemeError> {
        if call.context.take().is_none() {
            warn!(state = %call.state, "source cleanup without a prepared split");
        } else {
            debug!(resource = %self.resource, "source split cleaned up");
        }
        call.state = SplitState::Cleaned;
        Ok(())
    }

    fn sink_prepare<O: Collector>(&self, call: &mut SinkCall<O>) -> Result<(), SchemeError> {
        if call.state != SplitState::Unprepared {
            return Err(invalid_state(SplitState::Unprepared, call.state));
        }
        call.settings.validate_target()?;

        let outgoing = call.outgoing.fields();
        let fields = if outgoing.is_defined() {
            outgoing
        } else {
            &self.sink_fields
        };
        let names = resolve_names(Some(fields));

        debug!(
            resource = %self.resource,
            fields = names.len(),
            "sink split prepared"
        );
        call.context = Some(SinkContext::new(names));
        call.state = SplitState::Prepared;
        Ok(())
    }

    fn sink<O: Collector>(&self, call: &mut SinkCall<O>) -> Result<(), SchemeError> {
        let Some(ctx) = call.context.as_ref() else {
            return Err(invalid_state(SplitState::Prepared, call.state));
        };
        call.output.collect(&call.outgoing, ctx)
    }

    fn sink_cleanup<O: Collector>(&self, call: &mut SinkCall<O>) -> Result<(), SchemeError> {
        if call.context.take().is_none() {
            warn!(state = %call.state, "sink cleanup without a prepared split");
        } else {
            debug!(resource = %self.resource, "sink split cleaned up");
        }
        call.state = SplitState::Cleaned;
        Ok(())
    }
}
