//! Inference configuration: extra resolver tables and description templates.
//!
//! Every field is optional and overlays the built-in defaults. The value is
//! loaded once at startup and handed to [`EntityResolver::with_config`] and
//! [`DescriptionTemplates::with_config`]; nothing reads it afterwards.
//!
//! [`EntityResolver::with_config`]: crate::resolver::EntityResolver::with_config
//! [`DescriptionTemplates::with_config`]: crate::resolver::DescriptionTemplates::with_config

use std::collections::BTreeMap;
use std::path::Path;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resolver::ActionForms;

/// Errors from loading or applying configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(metta::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    #[diagnostic(
        code(metta::config::parse),
        help("Files ending in .json are read as JSON, anything else as TOML. Check the syntax.")
    )]
    Parse { path: String, message: String },

    #[error("invalid name pattern '{pattern}': {message}")]
    #[diagnostic(
        code(metta::config::invalid_pattern),
        help("Name patterns marked `regex = true` must be valid regular expressions.")
    )]
    InvalidPattern { pattern: String, message: String },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Literal substring rewrite applied to humanized identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialCharMapping {
    pub from: String,
    pub to: String,
}

/// Rewrite applied after special characters, literal unless `regex` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamePattern {
    pub pattern: String,
    pub replacement: String,
    #[serde(default)]
    pub regex: bool,
}

/// Configuration overlay for the resolver and templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Identifier → display name.
    pub entity_mappings: BTreeMap<String, String>,
    /// Applied in order; each entry rewrites all its occurrences.
    pub special_characters: Vec<SpecialCharMapping>,
    pub name_patterns: Vec<NamePattern>,
    /// Action or eventuality identifier → verb forms.
    pub action_mappings: BTreeMap<String, ActionForms>,
    pub instrument_mappings: BTreeMap<String, String>,
    pub port_mappings: BTreeMap<String, String>,
    /// Identifier of the vessel the leave-permission rule applies to.
    pub primary_vessel: Option<String>,
    /// Template id → pattern with `{placeholder}` slots.
    pub templates: BTreeMap<String, String>,
}

#[derive(Clone, Copy)]
enum Format {
    Toml,
    Json,
}

impl InferenceConfig {
    /// Load from a file: `.json` as JSON, anything else as TOML.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let format = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Format::Json,
            _ => Format::Toml,
        };
        let config = Self::parse(&content, format, &path.display().to_string())?;
        tracing::info!(
            path = %path.display(),
            entities = config.entity_mappings.len(),
            templates = config.templates.len(),
            "loaded inference config"
        );
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Self::parse(content, Format::Toml, "<toml>")
    }

    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        Self::parse(content, Format::Json, "<json>")
    }

    fn parse(content: &str, format: Format, origin: &str) -> ConfigResult<Self> {
        let parsed: Result<Self, String> = match format {
            Format::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| ConfigError::Parse {
            path: origin.to_string(),
            message,
        })
    }

    /// Serialize as pretty TOML.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: "<toml>".to_string(),
            message: e.to_string(),
        })
    }
}
