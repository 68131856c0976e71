//! Configuration for rdg
//!
//! Settings come from a TOML file, then environment variable overrides, then
//! command-line flags.
//!
//! # Configuration File Locations
//!
//! Configuration files are searched in order (first found wins):
//! 1. `./rdg.toml` - Project-local configuration
//! 2. `~/.config/rdg/config.toml` - User configuration (XDG)
//! 3. `~/.rdg/config.toml` - User configuration (legacy)
//! 4. `/etc/rdg/config.toml` - System-wide configuration
//!
//! # Environment Variables
//!
//! - `RDG_LOG_LEVEL` - Logging verbosity (quiet, normal, verbose, debug)
//! - `RDG_FORMAT` - Output format (ntriples, json)
//! - `RDG_RESOURCE_KIND`, `RDG_SUBJECT_KIND`, `RDG_OBJECT_KIND` - Mapping
//!   kinds (sub, sub_if_not_top, super, equivalent, any)
//! - `RDG_TRANSLATE` - Translate into the template vocabulary (true/false)
//! - `RDG_DEFAULTS` - Back-fill template default values (true/false)
//! - `RDG_STRICT_RESOURCE` - Require identical resource identifiers
//! - `RDG_MAX_DEPTH` - Bound on nested subsumption checks
//!
//! # Example Configuration
//!
//! ```toml
//! [general]
//! format = "ntriples"
//! log_level = "normal"
//!
//! [validation]
//! subject_kind = "sub"
//! object_kind = "sub_if_not_top"
//! translate = true
//!
//! [reasoner]
//! max_depth = 32
//! ontologies = ["ontology/process.ttl"]
//!
//! [prefixes]
//! ex = "http://example.org/"
//! ```

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::mapping::MappingKind;
use crate::protocol::ValidationOptions;
use crate::reasoner::DEFAULT_MAX_DEPTH;

// ============================================================================
// Configuration Schema
// ============================================================================

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RdgConfig {
    pub general: GeneralConfig,
    /// Default options of every validation pass
    pub validation: ValidationOptions,
    pub reasoner: ReasonerConfig,
    /// Prefixes available to every document read
    pub prefixes: HashMap<String, String>,
}

/// General configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Base URI for relative references in input documents
    pub base_uri: Option<String>,
    /// Output format for accepted documents
    pub format: OutputFormat,
    pub log_level: LogLevel,
    /// Enable colored log output
    pub color: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            base_uri: None,
            format: OutputFormat::NTriples,
            log_level: LogLevel::Normal,
            color: true,
        }
    }
}

/// Reasoner configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasonerConfig {
    /// Bound on nested subsumption checks
    pub max_depth: usize,
    /// Ontology files loaded into every pass
    pub ontologies: Vec<PathBuf>,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            ontologies: Vec::new(),
        }
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    NTriples,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::NTriples => "ntriples",
            OutputFormat::Json => "json",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "nt" | "ntriples" | "n-triples" => Some(OutputFormat::NTriples),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Log level options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Quiet,
    #[default]
    Normal,
    Verbose,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Verbose => "verbose",
            LogLevel::Debug => "debug",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "quiet" | "q" | "0" => Some(LogLevel::Quiet),
            "normal" | "n" | "1" => Some(LogLevel::Normal),
            "verbose" | "v" | "2" => Some(LogLevel::Verbose),
            "debug" | "d" | "3" => Some(LogLevel::Debug),
            _ => None,
        }
    }

    /// `tracing` filter directive for this level
    pub fn filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Quiet => "off",
            LogLevel::Normal => "warn",
            LogLevel::Verbose => "rdg=debug",
            LogLevel::Debug => "rdg=trace",
        }
    }
}

// ============================================================================
// Configuration Loading
// ============================================================================

impl RdgConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from default locations, then apply environment
    /// variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for path in Self::config_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading configuration");
                config = Self::load_from_file(&path)?;
                break;
            }
        }

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))
    }

    pub fn load_from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(PathBuf::from("<string>"), e.to_string()))
    }

    /// Config file search paths, in priority order
    pub fn config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        paths.push(PathBuf::from("./rdg.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("rdg").join("config.toml"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".rdg").join("config.toml"));
        }

        #[cfg(unix)]
        paths.push(PathBuf::from("/etc/rdg/config.toml"));

        paths
    }

    /// Apply `RDG_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply overrides looked up by variable name. Unparseable values are
    /// ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("RDG_LOG_LEVEL") {
            match LogLevel::from_str(&val) {
                Some(level) => self.general.log_level = level,
                None => ignored("RDG_LOG_LEVEL", &val),
            }
        }

        if let Some(val) = lookup("RDG_FORMAT") {
            match OutputFormat::from_str(&val) {
                Some(format) => self.general.format = format,
                None => ignored("RDG_FORMAT", &val),
            }
        }

        let kinds = [
            ("RDG_RESOURCE_KIND", &mut self.validation.resource_kind),
            ("RDG_SUBJECT_KIND", &mut self.validation.subject_kind),
            ("RDG_OBJECT_KIND", &mut self.validation.object_kind),
        ];
        for (key, slot) in kinds {
            if let Some(val) = lookup(key) {
                match MappingKind::from_str(&val) {
                    Some(kind) => *slot = kind,
                    None => ignored(key, &val),
                }
            }
        }

        let flags = [
            ("RDG_TRANSLATE", &mut self.validation.translate),
            ("RDG_DEFAULTS", &mut self.validation.closed_world_defaults),
            ("RDG_STRICT_RESOURCE", &mut self.validation.strict_resource),
        ];
        for (key, slot) in flags {
            if let Some(val) = lookup(key) {
                *slot = val == "true" || val == "1" || val == "yes";
            }
        }

        if let Some(val) = lookup("RDG_MAX_DEPTH") {
            match val.parse::<usize>() {
                Ok(depth) => self.reasoner.max_depth = depth,
                Err(_) => ignored("RDG_MAX_DEPTH", &val),
            }
        }
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// Write configuration to a file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml()?;
        fs::write(path, content).map_err(|e| ConfigError::IoError(path.to_path_buf(), e.to_string()))
    }
}

fn ignored(key: &str, value: &str) {
    tracing::warn!(key, value, "ignoring unrecognized environment override");
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error reading/writing config file
    IoError(PathBuf, String),
    /// Parse error in config file
    ParseError(PathBuf, String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, msg) => {
                write!(f, "IO error reading {}: {}", path.display(), msg)
            }
            ConfigError::ParseError(path, msg) => {
                write!(f, "Parse error in {}: {}", path.display(), msg)
            }
            ConfigError::SerializeError(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RdgConfig::new();
        assert_eq!(config.general.format, OutputFormat::NTriples);
        assert_eq!(config.validation, ValidationOptions::default());
        assert_eq!(config.validation.subject_kind, MappingKind::Sub);
        assert_eq!(config.reasoner.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [general]
            format = "json"
            log_level = "verbose"

            [validation]
            subject_kind = "equivalent"
            strict_resource = true

            [reasoner]
            max_depth = 8
            ontologies = ["a.ttl", "b.ttl"]

            [prefixes]
            ex = "http://example.org/"
        "#;

        let config = RdgConfig::load_from_str(toml).unwrap();
        assert_eq!(config.general.format, OutputFormat::Json);
        assert_eq!(config.general.log_level, LogLevel::Verbose);
        assert_eq!(config.validation.subject_kind, MappingKind::Equivalent);
        assert_eq!(config.validation.object_kind, MappingKind::SubIfNotTop);
        assert!(config.validation.strict_resource);
        assert!(config.validation.translate);
        assert_eq!(config.reasoner.max_depth, 8);
        assert_eq!(config.reasoner.ontologies, vec![PathBuf::from("a.ttl"), PathBuf::from("b.ttl")]);
        assert_eq!(config.prefixes.get("ex"), Some(&"http://example.org/".to_string()));
    }

    #[test]
    fn test_parse_error() {
        let result = RdgConfig::load_from_str("[validation]\nsubject_kind = \"sideways\"");
        assert!(matches!(result, Err(ConfigError::ParseError(_, _))));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("RDG_LOG_LEVEL", "debug"),
            ("RDG_FORMAT", "json"),
            ("RDG_SUBJECT_KIND", "any"),
            ("RDG_OBJECT_KIND", "bogus"),
            ("RDG_TRANSLATE", "false"),
            ("RDG_STRICT_RESOURCE", "yes"),
            ("RDG_MAX_DEPTH", "4"),
        ]
        .into_iter()
        .collect();

        let mut config = RdgConfig::new();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.general.log_level, LogLevel::Debug);
        assert_eq!(config.general.format, OutputFormat::Json);
        assert_eq!(config.validation.subject_kind, MappingKind::Any);
        assert_eq!(config.validation.object_kind, MappingKind::SubIfNotTop);
        assert!(!config.validation.translate);
        assert!(config.validation.closed_world_defaults);
        assert!(config.validation.strict_resource);
        assert_eq!(config.reasoner.max_depth, 4);
    }

    #[test]
    fn test_enum_names() {
        assert_eq!(OutputFormat::from_str("nt"), Some(OutputFormat::NTriples));
        assert_eq!(OutputFormat::from_str("xml"), None);
        assert_eq!(LogLevel::from_str("v"), Some(LogLevel::Verbose));
        assert_eq!(LogLevel::Quiet.filter_directive(), "off");
    }

    #[test]
    fn test_serialize_round_trip() {
        let mut config = RdgConfig::new();
        config.validation.object_kind = MappingKind::Super;
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[validation]"));
        assert!(toml.contains("object_kind = \"super\""));

        let back = RdgConfig::load_from_str(&toml).unwrap();
        assert_eq!(back.validation, config.validation);
    }

    #[test]
    fn test_config_paths() {
        let paths = RdgConfig::config_paths();
        assert!(paths[0].ends_with("rdg.toml"));
    }
}
