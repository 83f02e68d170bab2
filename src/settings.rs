//! Compiler settings, loaded from TOML.
//!
//! ```toml
//! [compiler]
//! clause_separator = "newline"
//! max_query_length = 2000
//! ```
//!
//! Lookup order: explicit path, `./rulesql.toml`, `<config_dir>/rulesql/config.toml`,
//! then built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RuleError, RuleResult};

pub const LOCAL_SETTINGS_FILE: &str = "rulesql.toml";

/// Text placed between top-level SQL clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClauseSeparator {
    #[default]
    Space,
    Newline,
}

impl ClauseSeparator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClauseSeparator::Space => " ",
            ClauseSeparator::Newline => "\n",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerSettings {
    pub clause_separator: ClauseSeparator,
    /// Queries longer than this (whitespace-normalized) get a syntax warning.
    pub max_query_length: usize,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            clause_separator: ClauseSeparator::Space,
            max_query_length: 1000,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    compiler: CompilerSettings,
}

impl CompilerSettings {
    /// Parse the `[compiler]` table of a settings document.
    pub fn from_toml_str(content: &str) -> RuleResult<Self> {
        let file: SettingsFile =
            toml::from_str(content).map_err(|e| RuleError::Config(e.to_string()))?;
        Ok(file.compiler)
    }

    /// Load settings using the lookup order described in the module docs.
    pub fn load(explicit: Option<&Path>) -> RuleResult<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(RuleError::Config(format!(
                    "Settings file not found: {}",
                    path.display()
                )));
            }
            return Self::read(path);
        }

        for candidate in Self::search_paths() {
            if candidate.exists() {
                tracing::debug!("Loading settings from {}", candidate.display());
                return Self::read(&candidate);
            }
        }
        Ok(Self::default())
    }

    fn read(path: &Path) -> RuleResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: SettingsFile = toml::from_str(&content)
            .map_err(|e| RuleError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(file.compiler)
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_SETTINGS_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("rulesql").join("config.toml"));
        }
        paths
    }
}
