//! Analysis configuration, read from the `[analysis]` table of `sqlbind.toml`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::callsite::OptionSet;
use crate::errors::ConfigError;

/// Configuration for the analysis engine. Every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Worker threads. 0 = one per core.
    pub threads: Option<usize>,
    /// Default strictness for command text. Default: false.
    pub strict_mode: Option<bool>,
    /// Legacy-compatible scopes stay silent about dynamic text even when
    /// `strict_mode` is set. Default: false.
    pub legacy_compat: Option<bool>,
    /// Default strict column typing. Default: false.
    pub strict_types: Option<bool>,
    /// Report info-level diagnostics. Default: true.
    pub report_info: Option<bool>,
    /// Diagnostic codes to drop from the output.
    #[serde(default)]
    pub suppress: Vec<String>,
    /// Capacity of the lexed command-text cache. Default: 4096.
    pub command_text_cache_capacity: Option<u64>,
    /// Default batch size for sequence parameters. Default: unset.
    pub default_batch_size: Option<u32>,
    /// Match `first_name` to `FirstName`. Default: false.
    pub match_names_with_underscores: Option<bool>,
    /// Backend assumed when the connection type says nothing.
    pub default_backend: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    analysis: AnalysisConfig,
}

impl AnalysisConfig {
    /// Parse the `[analysis]` table out of a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(source).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        file.analysis.validate()?;
        Ok(file.analysis)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(threads) = self.threads {
            if threads > 1024 {
                return Err(ConfigError::Invalid {
                    field: "threads",
                    reason: format!("{threads} exceeds the limit of 1024"),
                });
            }
        }
        if self.command_text_cache_capacity == Some(0) {
            return Err(ConfigError::Invalid {
                field: "command_text_cache_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.default_batch_size == Some(0) {
            return Err(ConfigError::Invalid {
                field: "default_batch_size",
                reason: "must be at least 1 when set".to_string(),
            });
        }
        for code in &self.suppress {
            if code.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field: "suppress",
                    reason: "empty diagnostic code".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Returns the effective thread count, defaulting to 0 (auto-detect).
    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or(0)
    }

    pub fn effective_report_info(&self) -> bool {
        self.report_info.unwrap_or(true)
    }

    pub fn effective_command_text_cache_capacity(&self) -> u64 {
        self.command_text_cache_capacity.unwrap_or(4096)
    }

    /// Whether non-constant command text is reported in strict scopes.
    pub fn effective_legacy_compat(&self) -> bool {
        self.legacy_compat.unwrap_or(false)
    }

    pub fn is_suppressed(&self, code: &str) -> bool {
        self.suppress.iter().any(|c| c.eq_ignore_ascii_case(code))
    }

    /// The outermost scope of option inheritance.
    pub fn global_options(&self) -> OptionSet {
        OptionSet {
            strict_sql: self.strict_mode,
            strict_types: self.strict_types,
            batch_size: self.default_batch_size,
            match_names_with_underscores: self.match_names_with_underscores,
            backend: self.default_backend.clone(),
            ..Default::default()
        }
    }
}
