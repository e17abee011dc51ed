// crates/pathway-gate-config/src/config.rs
// ============================================================================
// Module: Pathway Gate Configuration
// Description: Configuration loading and validation for Pathway Gate hosts.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: pathway-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every section is optional and falls back to the engine defaults; values
//! that are present must pass validation or loading fails.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use pathway_gate_core::CohortWeighting;
use pathway_gate_core::EngineConfig;
use pathway_gate_core::GraphLimits;
use pathway_gate_core::runtime::DEFAULT_MAX_ACTIVITIES;
use pathway_gate_core::runtime::DEFAULT_MAX_GROUPS_PER_ACTIVITY;
use pathway_gate_core::runtime::DEFAULT_MAX_ITEMS_PER_GROUP;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "pathway-gate.toml";
/// Environment variable that overrides the configuration path.
pub const CONFIG_ENV_VAR: &str = "PATHWAY_GATE_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum length of a full path.
pub const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Hard ceiling for `limits.max_activities_per_pathway`.
pub const MAX_ACTIVITIES_CEILING: usize = 65_536;
/// Hard ceiling for `limits.max_groups_per_activity`.
pub const MAX_GROUPS_CEILING: usize = 1_024;
/// Hard ceiling for `limits.max_items_per_group`.
pub const MAX_ITEMS_CEILING: usize = 65_536;

// ============================================================================
// SECTION: Configuration Model
// ============================================================================

/// Pathway Gate host configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathwayGateConfig {
    /// Structural limits for pathway snapshots and edits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Rollup composition settings.
    #[serde(default)]
    pub rollup: RollupConfig,
    /// Audit sink settings.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl PathwayGateConfig {
    /// Loads configuration from disk using the default resolution rules:
    /// explicit path, then `PATHWAY_GATE_CONFIG`, then `pathway-gate.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
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
        self.limits.validate()?;
        self.audit.validate()?;
        Ok(())
    }

    /// Converts the configuration into engine settings.
    #[must_use]
    pub const fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            limits: self.limits.graph_limits(),
            cohort_weighting: self.rollup.cohort_weighting,
        }
    }
}

/// Structural limits configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LimitsConfig {
    /// Maximum activities per pathway snapshot.
    #[serde(default = "default_max_activities")]
    pub max_activities_per_pathway: usize,
    /// Maximum prerequisite groups per gated activity.
    #[serde(default = "default_max_groups")]
    pub max_groups_per_activity: usize,
    /// Maximum distinct items per prerequisite group.
    #[serde(default = "default_max_items")]
    pub max_items_per_group: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_activities_per_pathway: default_max_activities(),
            max_groups_per_activity: default_max_groups(),
            max_items_per_group: default_max_items(),
        }
    }
}

impl LimitsConfig {
    /// Validates limit ranges.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_limit(
            "limits.max_activities_per_pathway",
            self.max_activities_per_pathway,
            MAX_ACTIVITIES_CEILING,
        )?;
        validate_limit(
            "limits.max_groups_per_activity",
            self.max_groups_per_activity,
            MAX_GROUPS_CEILING,
        )?;
        validate_limit("limits.max_items_per_group", self.max_items_per_group, MAX_ITEMS_CEILING)?;
        Ok(())
    }

    /// Returns the engine graph limits.
    #[must_use]
    pub const fn graph_limits(&self) -> GraphLimits {
        GraphLimits {
            max_activities: self.max_activities_per_pathway,
            max_groups_per_activity: self.max_groups_per_activity,
            max_items_per_group: self.max_items_per_group,
        }
    }
}

/// Rollup composition configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RollupConfig {
    /// Weighting applied when composing pathway rollups into a cohort rollup.
    #[serde(default)]
    pub cohort_weighting: CohortWeighting,
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Audit events are discarded.
    #[default]
    #[serde(rename = "none")]
    Disabled,
    /// JSON lines written to stderr.
    Stderr,
    /// JSON lines appended to a file.
    File,
}

/// Audit configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuditConfig {
    /// Sink receiving audit events.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Output path for the file sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required when audit.sink = \"file\"".to_string()))
            }
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", path),
            (AuditSinkKind::Disabled | AuditSinkKind::Stderr, Some(_)) => Err(ConfigError::Invalid(
                "audit.path is only allowed when audit.sink = \"file\"".to_string(),
            )),
            (AuditSinkKind::Disabled | AuditSinkKind::Stderr, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
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

/// Resolves the config path from an explicit argument, the environment, or the default name.
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

/// Validates the resolved path against length limits.
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

/// Validates a configured path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates that a limit lies in `1 ..= ceiling`.
fn validate_limit(field: &str, value: usize, ceiling: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid(format!("{field} must be greater than zero")));
    }
    if value > ceiling {
        return Err(ConfigError::Invalid(format!("{field} must be at most {ceiling}")));
    }
    Ok(())
}

/// Default maximum activities per pathway.
const fn default_max_activities() -> usize {
    DEFAULT_MAX_ACTIVITIES
}

/// Default maximum groups per activity.
const fn default_max_groups() -> usize {
    DEFAULT_MAX_GROUPS_PER_ACTIVITY
}

/// Default maximum items per group.
const fn default_max_items() -> usize {
    DEFAULT_MAX_ITEMS_PER_GROUP
}
