//! Loader for site configuration with YAML + environment overlays.
//!
//! Sources are merged in the order they are added; `FOLIO__`-prefixed
//! environment variables always win (`FOLIO__CONTACT__ACCESS_KEY` maps to
//! `contact.access_key`). String values may reference `${VAR}` placeholders,
//! which are expanded after merging. Every field has a default, so an empty
//! source set yields a working configuration.
//!
//! ```yaml
//! version: "1"
//! typewriter:
//!   phrases: ["Full-Stack Developer", "Building scalable web applications"]
//!   hold_ms: 1500
//! contact:
//!   access_key: "${WEB3FORMS_ACCESS_KEY}"
//! logging:
//!   format: json
//! ```
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

pub const DEFAULT_CONTACT_ENDPOINT: &str = "https://api.web3forms.com/submit";

#[derive(Debug, thiserror::Error)]
pub enum SiteConfigError {
    #[error(transparent)]
    Source(#[from] ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteConfig {
    pub version: Option<String>,
    #[serde(default)]
    pub typewriter: TypewriterConfig,
    #[serde(default)]
    pub contact: ContactConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Hero typewriter: rotation and pacing.
#[derive(Debug, Clone, Deserialize)]
pub struct TypewriterConfig {
    #[serde(default = "default_phrases")]
    pub phrases: Vec<String>,
    #[serde(default = "default_type_delay_ms")]
    pub type_delay_ms: u64,
    #[serde(default = "default_delete_delay_ms")]
    pub delete_delay_ms: u64,
    #[serde(default = "default_hold_ms")]
    pub hold_ms: u64,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            phrases: default_phrases(),
            type_delay_ms: default_type_delay_ms(),
            delete_delay_ms: default_delete_delay_ms(),
            hold_ms: default_hold_ms(),
        }
    }
}

impl TypewriterConfig {
    pub fn type_delay(&self) -> Duration {
        Duration::from_millis(self.type_delay_ms)
    }
    pub fn delete_delay(&self) -> Duration {
        Duration::from_millis(self.delete_delay_ms)
    }
    pub fn hold(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }
}

/// Contact form relay and user-facing messages.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactConfig {
    #[serde(default = "default_contact_endpoint")]
    pub endpoint: String,
    /// Relay credential. Usually `${WEB3FORMS_ACCESS_KEY}`.
    #[serde(default)]
    pub access_key: Option<String>,
    /// No per-request timeout when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_success_reset_ms")]
    pub success_reset_ms: u64,
    #[serde(default = "default_failure_reset_ms")]
    pub failure_reset_ms: u64,
    #[serde(default)]
    pub messages: ContactMessages,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            endpoint: default_contact_endpoint(),
            access_key: None,
            timeout_secs: None,
            success_reset_ms: default_success_reset_ms(),
            failure_reset_ms: default_failure_reset_ms(),
            messages: ContactMessages::default(),
        }
    }
}

impl ContactConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
    pub fn success_reset(&self) -> Duration {
        Duration::from_millis(self.success_reset_ms)
    }
    pub fn failure_reset(&self) -> Duration {
        Duration::from_millis(self.failure_reset_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactMessages {
    #[serde(default = "default_sending_message")]
    pub sending: String,
    #[serde(default = "default_success_message")]
    pub success: String,
    #[serde(default = "default_failure_message")]
    pub failure: String,
}

impl Default for ContactMessages {
    fn default() -> Self {
        Self {
            sending: default_sending_message(),
            success: default_success_message(),
            failure: default_failure_message(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `text` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub emit_stderr: bool,
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            emit_stderr: false,
            filter: default_log_filter(),
            dir: None,
        }
    }
}

fn default_phrases() -> Vec<String> {
    [
        "Full-Stack Developer",
        "Building scalable web applications",
        "Creating interactive digital experiences",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_type_delay_ms() -> u64 {
    150
}
fn default_delete_delay_ms() -> u64 {
    100
}
fn default_hold_ms() -> u64 {
    1500
}
fn default_contact_endpoint() -> String {
    DEFAULT_CONTACT_ENDPOINT.into()
}
fn default_success_reset_ms() -> u64 {
    4000
}
fn default_failure_reset_ms() -> u64 {
    3000
}
fn default_sending_message() -> String {
    "Sending....".into()
}
fn default_success_message() -> String {
    "Form Submitted Successfully".into()
}
fn default_failure_message() -> String {
    "Something went wrong. Please try again.".into()
}
fn default_log_format() -> String {
    "text".into()
}
fn default_log_filter() -> String {
    "info".into()
}

impl SiteConfig {
    /// Reject configurations the widgets cannot run with.
    pub fn validate(&self) -> Result<(), SiteConfigError> {
        if self.typewriter.phrases.is_empty() {
            return Err(SiteConfigError::Invalid(
                "typewriter.phrases must not be empty".into(),
            ));
        }
        if let Some(idx) = self.typewriter.phrases.iter().position(|p| p.is_empty()) {
            return Err(SiteConfigError::Invalid(format!(
                "typewriter.phrases[{idx}] is empty"
            )));
        }
        if self.typewriter.type_delay_ms == 0 || self.typewriter.delete_delay_ms == 0 {
            return Err(SiteConfigError::Invalid(
                "typewriter delays must be greater than zero".into(),
            ));
        }
        let endpoint = self.contact.endpoint.as_str();
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(SiteConfigError::Invalid(format!(
                "contact.endpoint must be an http(s) URL, got {endpoint:?}"
            )));
        }
        Ok(())
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct SiteConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for SiteConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteConfigLoader {
    /// Start with `FOLIO__` env overrides only.
    ///
    /// ```
    /// use folio_config::SiteConfigLoader;
    ///
    /// let config = SiteConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.typewriter.phrases.len(), 3);
    /// assert_eq!(config.contact.messages.sending, "Sending....");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Like [`with_file`](Self::with_file) but silently skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// Environment overrides are layered last, `${VAR}` placeholders are
    /// expanded, and the result is validated.
    ///
    /// ```
    /// use folio_config::SiteConfigLoader;
    ///
    /// unsafe { std::env::set_var("DOC_RELAY_KEY", "injected-from-env"); }
    ///
    /// let config = SiteConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// contact:
    ///   access_key: "${DOC_RELAY_KEY}"
    ///   failure_reset_ms: 2500
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.contact.access_key.as_deref(), Some("injected-from-env"));
    /// assert_eq!(config.contact.failure_reset_ms, 2500);
    /// assert_eq!(config.contact.success_reset_ms, 4000);
    ///
    /// unsafe { std::env::remove_var("DOC_RELAY_KEY"); }
    /// ```
    pub fn load(self) -> Result<SiteConfig, SiteConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("FOLIO")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("typewriter.phrases"),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: SiteConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed.validate()?;

        Ok(typed)
    }
}
