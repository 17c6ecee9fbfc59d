//! Adapter and job configuration types.
//!
//! - [`Settings`]: Key-value settings plus typed value reader/writer
//!   registrations
//! - [`ConfigKeySpec`]: Specification for a configuration key
//! - [`JobConf`]: Job-level wiring shared by every split of a job

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::SchemeError;
use crate::serde::{
    Registration, ValueReader, ValueReaderFactory, ValueWriter, ValueWriterFactory,
};

/// Target host(s), comma separated.
pub const NODES: &str = "docstore.nodes";

/// Target port.
pub const PORT: &str = "docstore.port";

/// Port used when [`PORT`] is not set.
pub const DEFAULT_PORT: u16 = 9200;

/// Target resource path (index or index/type).
pub const RESOURCE: &str = "docstore.resource";

/// User-declared field list, comma separated.
pub const FIELDS: &str = "docstore.fields";

/// Resolved field names published for the reader/writer, comma separated.
pub const TARGET_FIELDS: &str = "docstore.internal.target.fields";

/// Identifier of the registered value reader.
pub const VALUE_READER: &str = "docstore.ser.reader.value";

/// Identifier of the registered value writer.
pub const VALUE_WRITER: &str = "docstore.ser.writer.value";

/// Settings consumed by the adapter and its injected reader/writer.
///
/// Properties are plain strings, typically parsed from SQL `WITH (...)`
/// clauses. Value reader and writer factories travel alongside them as
/// typed registrations.
#[derive(Clone, Default)]
pub struct Settings {
    properties: HashMap<String, String>,
    value_reader: Option<Registration<ValueReaderFactory>>,
    value_writer: Option<Registration<ValueWriterFactory>>,
}

impl Settings {
    /// Creates empty settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates settings from existing properties.
    #[must_use]
    pub fn with_properties(properties: HashMap<String, String>) -> Self {
        Self {
            properties,
            ..Self::default()
        }
    }

    /// Sets a property.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Sets a property only if it is not already present.
    ///
    /// Returns `true` if the value was stored.
    pub fn set_if_absent(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.properties.contains_key(&key) {
            return false;
        }
        self.properties.insert(key, value.into());
        true
    }

    /// Gets a property.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Gets a required property, returning an error if missing.
    ///
    /// # Errors
    ///
    /// Returns `SchemeError::MissingConfig` if the key is not set.
    pub fn require(&self, key: &str) -> Result<&str, SchemeError> {
        self.get(key)
            .ok_or_else(|| SchemeError::MissingConfig(key.to_string()))
    }

    /// Gets a property parsed as the given type.
    ///
    /// # Errors
    ///
    /// Returns `SchemeError::ConfigurationError` if the value cannot be parsed.
    pub fn get_parsed<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>, SchemeError>
    where
        T::Err: fmt::Display,
    {
        match self.get(key) {
            Some(v) => v.parse::<T>().map(Some).map_err(|e| {
                SchemeError::ConfigurationError(format!("invalid value for '{key}': {e}"))
            }),
            None => Ok(None),
        }
    }

    /// Gets a required property parsed as the given type.
    ///
    /// # Errors
    ///
    /// Returns `SchemeError::MissingConfig` if the key is missing, or
    /// `SchemeError::ConfigurationError` if parsing fails.
    pub fn require_parsed<T: std::str::FromStr>(&self, key: &str) -> Result<T, SchemeError>
    where
        T::Err: fmt::Display,
    {
        let value = self.require(key)?;
        value.parse::<T>().map_err(|e| {
            SchemeError::ConfigurationError(format!("invalid value for '{key}': {e}"))
        })
    }

    /// Returns all properties.
    #[must_use]
    pub fn properties(&self) -> &HashMap<String, String> {
        &self.properties
    }

    /// Returns properties with a given prefix, with the prefix stripped.
    #[must_use]
    pub fn properties_with_prefix(&self, prefix: &str) -> HashMap<String, String> {
        self.properties
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix(prefix)
                    .map(|stripped| (stripped.to_string(), v.clone()))
            })
            .collect()
    }

    /// Validates the settings against a set of key specifications.
    ///
    /// # Errors
    ///
    /// Returns `SchemeError::MissingConfig` for the first required key that
    /// is neither set nor defaulted.
    pub fn validate(&self, specs: &[ConfigKeySpec]) -> Result<(), SchemeError> {
        for spec in specs {
            if spec.required && spec.default.is_none() && self.get(&spec.key).is_none() {
                return Err(SchemeError::MissingConfig(spec.key.clone()));
            }
        }
        Ok(())
    }

    // ── Connection target ──

    /// Publishes the connection target.
    pub fn set_target(&mut self, hosts: &str, port: u16, resource: &str) {
        self.set(NODES, hosts);
        self.set(PORT, port.to_string());
        self.set(RESOURCE, resource);
    }

    /// Returns the configured hosts, trimmed, blank entries dropped.
    #[must_use]
    pub fn hosts(&self) -> Vec<&str> {
        self.get(NODES)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|h| !h.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the target port, falling back to [`DEFAULT_PORT`].
    ///
    /// # Errors
    ///
    /// Returns `SchemeError::ConfigurationError` if the port is not a
    /// number or is zero.
    pub fn port(&self) -> Result<u16, SchemeError> {
        let port = self.get_parsed::<u16>(PORT)?.unwrap_or(DEFAULT_PORT);
        if port == 0 {
            return Err(SchemeError::ConfigurationError(format!(
                "invalid value for '{PORT}': 0"
            )));
        }
        Ok(port)
    }

    /// Returns the target resource path.
    #[must_use]
    pub fn resource(&self) -> Option<&str> {
        self.get(RESOURCE).filter(|r| !r.trim().is_empty())
    }

    /// Returns the published target field names.
    #[must_use]
    pub fn target_fields(&self) -> Vec<String> {
        self.get(TARGET_FIELDS)
            .map(|v| {
                v.split(',')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Checks that host, port and resource describe a usable target.
    ///
    /// # Errors
    ///
    /// Returns `SchemeError::MissingConfig` if host or resource is absent,
    /// or `SchemeError::ConfigurationError` if the port is invalid.
    pub fn validate_target(&self) -> Result<(), SchemeError> {
        self.validate(&target_key_specs())?;
        if self.hosts().is_empty() {
            return Err(SchemeError::MissingConfig(NODES.to_string()));
        }
        if self.resource().is_none() {
            return Err(SchemeError::MissingConfig(RESOURCE.to_string()));
        }
        self.port()?;
        Ok(())
    }

    // ── Value reader / writer registration ──

    /// Registers a value reader unless one is already registered.
    ///
    /// A reader named through the [`VALUE_READER`] property counts as registered.
    /// Returns `true` if `name` was registered.
    pub fn set_value_reader_if_absent(
        &mut self,
        name: impl Into<String>,
        factory: ValueReaderFactory,
    ) -> bool {
        if self.value_reader.is_some() || self.get(VALUE_READER).is_some() {
            return false;
        }
        let registration = Registration::new(name, factory);
        self.set(VALUE_READER, registration.name());
        self.value_reader = Some(registration);
        true
    }

    /// Registers a value writer unless one is already registered.
    ///
    /// A writer named through the [`VALUE_WRITER`] property counts as registered.
    /// Returns `true` if `name` was registered.
    pub fn set_value_writer_if_absent(
        &mut self,
        name: impl Into<String>,
        factory: ValueWriterFactory,
    ) -> bool {
        if self.value_writer.is_some() || self.get(VALUE_WRITER).is_some() {
            return false;
        }
        let registration = Registration::new(name, factory);
        self.set(VALUE_WRITER, registration.name());
        self.value_writer = Some(registration);
        true
    }

    /// Name of the registered value reader, falling back to the
    /// [`VALUE_READER`] property.
    #[must_use]
    pub fn value_reader_name(&self) -> Option<&str> {
        self.value_reader
            .as_ref()
            .map(Registration::name)
            .or_else(|| self.get(VALUE_READER))
    }

    /// Name of the registered value writer, falling back to the
    /// [`VALUE_WRITER`] property.
    #[must_use]
    pub fn value_writer_name(&self) -> Option<&str> {
        self.value_writer
            .as_ref()
            .map(Registration::name)
            .or_else(|| self.get(VALUE_WRITER))
    }

    /// Instantiates the registered value reader.
    #[must_use]
    pub fn value_reader(&self) -> Option<Box<dyn ValueReader>> {
        self.value_reader.as_ref().map(|r| (r.factory())())
    }

    /// Instantiates the registered value writer.
    #[must_use]
    pub fn value_writer(&self) -> Option<Box<dyn ValueWriter>> {
        self.value_writer.as_ref().map(|r| (r.factory())())
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("properties", &self.properties)
            .field("value_reader", &self.value_reader_name())
            .field("value_writer", &self.value_writer_name())
            .finish()
    }
}

/// Key specifications of the connection target.
#[must_use]
pub fn target_key_specs() -> Vec<ConfigKeySpec> {
    vec![
        ConfigKeySpec::required(NODES, "Document store host(s), comma separated"),
        ConfigKeySpec::optional(PORT, "Document store port", DEFAULT_PORT.to_string()),
        ConfigKeySpec::required(RESOURCE, "Target index or index/type"),
    ]
}

/// Specification for a configuration key.
#[derive(Debug, Clone)]
pub struct ConfigKeySpec {
    /// The configuration key name.
    pub key: String,

    /// Human-readable description.
    pub description: String,

    /// Whether this key is required.
    pub required: bool,

    /// Default value if not provided.
    pub default: Option<String>,
}

impl ConfigKeySpec {
    /// Creates a required configuration key spec.
    #[must_use]
    pub fn required(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
            required: true,
            default: None,
        }
    }

    /// Creates an optional configuration key spec with a default value.
    #[must_use]
    pub fn optional(
        key: impl Into<String>,
        description: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
            required: false,
            default: Some(default.into()),
        }
    }
}

/// Input format bound to a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Reads documents from the configured resource.
    Document,
}

/// Output format bound to a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Writes documents to the configured resource.
    Document,
}

/// Output committer bound to a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputCommitter {
    /// Commits nothing; writes are visible as soon as they are acknowledged.
    Document,
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Document => write!(f, "DocumentInputFormat"),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Document => write!(f, "DocumentOutputFormat"),
        }
    }
}

impl fmt::Display for OutputCommitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputCommitter::Document => write!(f, "DocumentOutputCommitter"),
        }
    }
}

/// Job-level configuration shared by all splits of one job.
///
/// Mutated only during configuration initialization; splits consume the
/// [`Settings`] snapshot taken at the end of it.
#[derive(Debug, Clone, Default)]
pub struct JobConf {
    /// Settings visible to the adapter and its reader/writer.
    pub settings: Settings,

    /// Bound input format.
    pub input_format: Option<InputFormat>,

    /// Bound output format.
    pub output_format: Option<OutputFormat>,

    /// Output directory marker.
    ///
    /// Never used for I/O, but the job framework substitutes a temporary
    /// output location when it is missing.
    pub output_dir: Option<String>,

    /// Bound output committer.
    pub output_committer: Option<OutputCommitter>,
}

/// A [`JobConf`] shared between concurrently initializing splits.
pub type SharedJobConf = Arc<RwLock<JobConf>>;

impl JobConf {
    /// Creates an empty job configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a job configuration from existing settings.
    #[must_use]
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Wraps the configuration for sharing across split tasks.
    #[must_use]
    pub fn into_shared(self) -> SharedJobConf {
        Arc::new(RwLock::new(self))
    }
}
