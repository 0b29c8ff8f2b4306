// crates/sidebar-cta-config/src/config.rs
// ============================================================================
// Module: Sidebar CTA Configuration
// Description: Configuration loading and validation for sidebar CTA tooling.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, sidebar-cta-core, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from `sidebar-cta.toml` (or `SIDEBAR_CTA_CONFIG`)
//! and validated before use. Local flag overrides stand in for the remote
//! flag-delivery service during development; their payloads are kept raw and
//! only validated when the CTA is resolved.
//!
//! Security posture: config inputs are untrusted and bounded in size.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use sidebar_cta_core::CtaAuditSink;
use sidebar_cta_core::FeatureFlag;
use sidebar_cta_core::FileAuditSink;
use sidebar_cta_core::FlagValue;
use sidebar_cta_core::NoopAuditSink;
use sidebar_cta_core::SIDEBAR_CTA_FEATURE_FLAG;
use sidebar_cta_core::StaticFlagSource;
use sidebar_cta_core::StderrAuditSink;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "sidebar-cta.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "SIDEBAR_CTA_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of a flag key.
pub const MAX_FLAG_KEY_LENGTH: usize = 128;
/// Maximum number of local flag overrides.
pub const MAX_FLAG_OVERRIDES: usize = 256;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Sidebar CTA configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SidebarCtaConfig {
    /// CTA resolution settings.
    #[serde(default)]
    pub cta: CtaConfig,
    /// Audit sink settings.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Local flag overrides keyed by flag name.
    #[serde(default)]
    pub flags: BTreeMap<String, FlagOverrideConfig>,
}

impl SidebarCtaConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or
    /// validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cta.validate()?;
        self.audit.validate()?;
        if self.flags.len() > MAX_FLAG_OVERRIDES {
            return Err(ConfigError::Invalid("too many flag overrides".to_string()));
        }
        for key in self.flags.keys() {
            validate_flag_key("flags key", key)?;
        }
        Ok(())
    }

    /// Builds an in-memory flag source from the local overrides.
    #[must_use]
    pub fn flag_source(&self) -> StaticFlagSource {
        self.flags.iter().map(|(key, flag)| (key.clone(), flag.to_feature_flag())).collect()
    }

    /// Builds the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the audit file cannot be opened.
    pub fn audit_sink(&self) -> Result<Arc<dyn CtaAuditSink>, ConfigError> {
        self.audit.build_sink()
    }
}

/// CTA resolution settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CtaConfig {
    /// Flag key carrying the CTA payload.
    #[serde(default = "default_flag_key")]
    pub flag_key: String,
}

impl Default for CtaConfig {
    fn default() -> Self {
        Self {
            flag_key: default_flag_key(),
        }
    }
}

impl CtaConfig {
    /// Validates CTA settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_flag_key("cta.flag_key", &self.flag_key)
    }
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Discard audit events.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to `audit.path`.
    File,
}

/// Audit sink settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditConfig {
    /// Selected sink.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Log file path (file sink only).
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Validates audit settings.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, self.path.as_deref()) {
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", path),
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.sink=file requires audit.path".to_string()))
            }
            (_, Some(_)) => {
                Err(ConfigError::Invalid("audit.path is only valid with audit.sink=file".to_string()))
            }
            (_, None) => Ok(()),
        }
    }

    /// Builds the selected sink.
    fn build_sink(&self) -> Result<Arc<dyn CtaAuditSink>, ConfigError> {
        match (self.sink, self.path.as_deref()) {
            (AuditSinkKind::None, _) => Ok(Arc::new(NoopAuditSink)),
            (AuditSinkKind::Stderr, _) => Ok(Arc::new(StderrAuditSink)),
            (AuditSinkKind::File, Some(path)) => {
                let sink = FileAuditSink::new(Path::new(path.trim()))
                    .map_err(|err| ConfigError::Io(err.to_string()))?;
                Ok(Arc::new(sink))
            }
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.sink=file requires audit.path".to_string()))
            }
        }
    }
}

/// Local override for a single feature flag.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlagOverrideConfig {
    /// Enabled value (boolean or string); absent means disabled.
    #[serde(default)]
    pub enabled: Option<FlagValue>,
    /// Raw payload, validated at resolution time.
    #[serde(default)]
    pub payload: Option<Value>,
}

impl FlagOverrideConfig {
    /// Converts the override into a flag evaluation.
    #[must_use]
    pub fn to_feature_flag(&self) -> FeatureFlag {
        FeatureFlag {
            enabled: self.enabled.clone(),
            payload: self.payload.clone(),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Default flag key for the CTA payload.
fn default_flag_key() -> String {
    SIDEBAR_CTA_FEATURE_FLAG.to_string()
}

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a flag key: non-empty, bounded, `[A-Za-z0-9._-]` only.
fn validate_flag_key(field: &str, key: &str) -> Result<(), ConfigError> {
    if key.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if key.len() > MAX_FLAG_KEY_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    if !key.chars().all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-')) {
        return Err(ConfigError::Invalid(format!("{field} contains invalid characters: {key}")));
    }
    Ok(())
}
