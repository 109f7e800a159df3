//! Configuration for the layout solver

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::expr::{ExprLimits, DEFAULT_MAX_NESTING, DEFAULT_MAX_TOKENS};

/// Default cap on solver unknowns (1000 nodes)
pub const DEFAULT_MAX_VARIABLES: usize = 6_000;

/// Errors that can occur when loading a solver configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Configuration options for solving a layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    /// Upper bound on unknowns; elimination is cubic in this count
    pub max_variables: usize,
    /// Upper bound on tokens in one attribute expression
    pub max_expression_tokens: usize,
    /// Upper bound on parenthesis nesting in one attribute expression
    pub max_expression_nesting: usize,
}

/// TOML structure for deserializing configs
#[derive(Deserialize)]
struct TomlConfig {
    #[serde(default)]
    solver: TomlSolver,
}

#[derive(Deserialize, Default)]
struct TomlSolver {
    max_variables: Option<usize>,
    max_expression_tokens: Option<usize>,
    max_expression_nesting: Option<usize>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_variables: DEFAULT_MAX_VARIABLES,
            max_expression_tokens: DEFAULT_MAX_TOKENS,
            max_expression_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

impl SolverConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the variable cap
    pub fn with_max_variables(mut self, max_variables: usize) -> Self {
        self.max_variables = max_variables;
        self
    }

    /// Set the per-expression token cap
    pub fn with_max_expression_tokens(mut self, max_tokens: usize) -> Self {
        self.max_expression_tokens = max_tokens;
        self
    }

    /// Set the per-expression parenthesis nesting cap
    pub fn with_max_expression_nesting(mut self, max_nesting: usize) -> Self {
        self.max_expression_nesting = max_nesting;
        self
    }

    /// Expression size bounds derived from this configuration
    pub fn expr_limits(&self) -> ExprLimits {
        ExprLimits {
            max_tokens: self.max_expression_tokens,
            max_nesting: self.max_expression_nesting,
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from a TOML string; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let defaults = Self::default();
        let solver = parsed.solver;
        Ok(Self {
            max_variables: solver.max_variables.unwrap_or(defaults.max_variables),
            max_expression_tokens: solver
                .max_expression_tokens
                .unwrap_or(defaults.max_expression_tokens),
            max_expression_nesting: solver
                .max_expression_nesting
                .unwrap_or(defaults.max_expression_nesting),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SolverConfig::default();
        assert_eq!(config.max_variables, 6_000);
    }

    #[test]
    fn test_builder_pattern() {
        let config = SolverConfig::new()
            .with_max_variables(60)
            .with_max_expression_tokens(40)
            .with_max_expression_nesting(3);
        assert_eq!(config.max_variables, 60);
        assert_eq!(
            config.expr_limits(),
            ExprLimits {
                max_tokens: 40,
                max_nesting: 3
            }
        );
    }

    #[test]
    fn test_from_toml() {
        let config = SolverConfig::from_toml_str(
            "[solver]\nmax_variables = 120\nmax_expression_tokens = 64\n",
        )
        .unwrap();
        assert_eq!(config.max_variables, 120);
        assert_eq!(config.max_expression_tokens, 64);
        assert_eq!(config.max_expression_nesting, DEFAULT_MAX_NESTING);
    }

    #[test]
    fn test_from_toml_defaults() {
        assert_eq!(SolverConfig::from_toml_str("").unwrap(), SolverConfig::default());
        assert_eq!(
            SolverConfig::from_toml_str("[solver]\n").unwrap(),
            SolverConfig::default()
        );
    }

    #[test]
    fn test_from_toml_invalid() {
        let err = SolverConfig::from_toml_str("[solver]\nmax_variables = \"lots\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
