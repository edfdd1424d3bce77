//! Configuration loading from scriptlint.toml.

use crate::lint::RuleConfig;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};

/// Main configuration structure for scriptlint.toml.
#[derive(Debug, Deserialize, Default)]
pub struct ScriptlintConfig {
    /// Which rules emit diagnostics; all on when omitted.
    #[serde(default)]
    pub rules: RuleConfig,
    /// Output configuration.
    pub output: Option<OutputConfig>,
    /// History store configuration.
    pub history: Option<HistoryConfig>,
}

/// Output format configuration.
#[derive(Debug, Deserialize, Default)]
pub struct OutputConfig {
    /// Output format: "plain" or "json".
    pub format: Option<String>,
}

/// Persistent history configuration.
#[derive(Debug, Deserialize, Default)]
pub struct HistoryConfig {
    /// Whether to record lint results at all.
    pub enabled: Option<bool>,
    /// Where the history file lives; defaults to a sibling of the
    /// analyzed file.
    pub path: Option<PathBuf>,
    /// Most-recent entries to retain.
    pub limit: Option<usize>,
}

/// Loads configuration from scriptlint.toml if it exists.
pub fn load_config(root: &Path) -> Result<Option<ScriptlintConfig>> {
    let path = root.join("scriptlint.toml");
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)?;
    let cfg = toml::from_str(&content).context("Invalid scriptlint.toml")?;
    Ok(Some(cfg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_all_rules() {
        let cfg: ScriptlintConfig = toml::from_str("").unwrap();
        assert!(cfg.rules.missing_semicolon);
        assert!(cfg.rules.undeclared_variables);
        assert!(cfg.rules.unused_variables);
        assert!(cfg.output.is_none());
    }

    #[test]
    fn test_partial_rules_table() {
        let cfg: ScriptlintConfig = toml::from_str(
            r#"
[rules]
unused_variables = false

[output]
format = "json"

[history]
limit = 5
"#,
        )
        .unwrap();
        assert!(cfg.rules.missing_semicolon);
        assert!(!cfg.rules.unused_variables);
        assert_eq!(cfg.output.unwrap().format.as_deref(), Some("json"));
        assert_eq!(cfg.history.unwrap().limit, Some(5));
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = std::env::temp_dir().join("scriptlint_config_test_missing");
        std::fs::create_dir_all(&dir).unwrap();
        assert!(load_config(&dir).unwrap().is_none());
        std::fs::remove_dir_all(&dir).ok();
    }
}
