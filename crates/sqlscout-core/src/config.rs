//! Dialect configuration overrides loaded from TOML

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dialect::{Dialect, DialectConfig, IdentifierCasing};
use crate::error::ConfigError;
use crate::identifier::CaseSensitivity;

/// File name searched for by [`DialectOverrides::find_and_load`]
pub const CONFIG_FILE_NAME: &str = "sqlscout.toml";

/// Adjustments applied on top of a built-in dialect
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct DialectOverrides {
    /// Built-in dialect to start from (defaults to sqlserver)
    #[serde(default)]
    pub base: Option<String>,

    /// Words added to the base keyword table
    #[serde(default)]
    pub extra_keywords: Vec<String>,

    /// Replaces the extra identifier start characters
    pub identifier_start_chars: Option<Vec<char>>,

    /// Replaces the extra identifier part characters
    pub identifier_part_chars: Option<Vec<char>>,

    /// Replaces the bind variable prefixes
    pub bind_prefixes: Option<Vec<String>>,

    pub money_literals: Option<bool>,
    pub blob_literals: Option<bool>,
    pub backslash_escapes: Option<bool>,
    pub nested_block_comments: Option<bool>,
    pub casing: Option<IdentifierCasing>,
    pub case_sensitivity: Option<CaseSensitivity>,
}

impl DialectOverrides {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load overrides from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Look for sqlscout.toml in `start` or any of its parent directories
    pub fn find_and_load(start: &Path) -> Result<Option<Self>, ConfigError> {
        for dir in start.ancestors() {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Self::from_file(&config_path).map(Some);
            }
        }
        Ok(None)
    }

    pub fn base_dialect(&self) -> Result<Dialect, ConfigError> {
        match &self.base {
            Some(name) => name.parse(),
            None => Ok(Dialect::default()),
        }
    }

    /// Whether anything besides the base dialect is set
    fn changes_base(&self) -> bool {
        !self.extra_keywords.is_empty()
            || self.identifier_start_chars.is_some()
            || self.identifier_part_chars.is_some()
            || self.bind_prefixes.is_some()
            || self.money_literals.is_some()
            || self.blob_literals.is_some()
            || self.backslash_escapes.is_some()
            || self.nested_block_comments.is_some()
            || self.casing.is_some()
            || self.case_sensitivity.is_some()
    }

    /// Build an owned dialect configuration: the base dialect with every
    /// override applied.
    ///
    /// A configuration that differs from its base is named
    /// `<base>+overrides`, so it is never mistaken for the built-in one.
    pub fn build(&self) -> Result<DialectConfig, ConfigError> {
        let base = self.base_dialect()?;
        let mut config = base.config().clone();
        if self.changes_base() {
            config.name = format!("{base}+overrides");
        }

        if !self.extra_keywords.is_empty() {
            config.keywords = config.keywords.with_extra(&self.extra_keywords);
        }
        if let Some(chars) = &self.identifier_start_chars {
            config.identifier_start_chars = chars.clone();
        }
        if let Some(chars) = &self.identifier_part_chars {
            config.identifier_part_chars = chars.clone();
        }
        if let Some(prefixes) = &self.bind_prefixes {
            if prefixes.iter().any(|p| p.is_empty()) {
                return Err(ConfigError::EmptyBindPrefix);
            }
            config.bind_prefixes = prefixes.clone();
        }
        if let Some(enabled) = self.money_literals {
            config.money_literals = enabled;
        }
        if let Some(enabled) = self.blob_literals {
            config.blob_literals = enabled;
        }
        if let Some(enabled) = self.backslash_escapes {
            config.backslash_escapes = enabled;
        }
        if let Some(enabled) = self.nested_block_comments {
            config.nested_block_comments = enabled;
        }
        if let Some(casing) = self.casing {
            config.casing = casing;
        }
        if let Some(sensitivity) = self.case_sensitivity {
            config.case_sensitivity = sensitivity;
        }

        Ok(config.normalize())
    }
}
