use crate::error::Result;
use crate::paths;
use crate::types::Mode;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// DefaultsConfig
// ---------------------------------------------------------------------------

/// Values applied by `init` when the corresponding flag is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub mode: Mode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_cmd: Option<String>,
}

// ---------------------------------------------------------------------------
// ClassifyConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifyConfig {
    /// Lines of test output kept by `record --summary`.
    #[serde(default = "default_summary_lines")]
    pub summary_lines: usize,
    /// Extra substrings that mark a run as an infrastructure error.
    #[serde(default)]
    pub infra_patterns: Vec<String>,
}

fn default_summary_lines() -> usize {
    20
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            summary_lines: default_summary_lines(),
            infra_patterns: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub classify: ClassifyConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            defaults: DefaultsConfig::default(),
            classify: ClassifyConfig::default(),
        }
    }
}

impl Config {
    /// Load `<root>/.tdd-ai.yaml`. A missing file yields the defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.version != default_version() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!("unknown config version {}", self.version),
            });
        }

        if let Some(cmd) = &self.defaults.test_cmd {
            if cmd.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: "defaults.test_cmd is empty".to_string(),
                });
            }
        }

        if self.classify.summary_lines == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "classify.summary_lines must be greater than 0".to_string(),
            });
        }

        for (i, pattern) in self.classify.infra_patterns.iter().enumerate() {
            if pattern.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "classify.infra_patterns[{i}] is empty and would match every output"
                    ),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.classify.summary_lines, 20);
        assert_eq!(cfg.defaults.mode, Mode::Greenfield);
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(".tdd-ai.yaml"),
            "defaults:\n  mode: retrofit\n  test_cmd: go test ./...\n",
        )
        .unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.defaults.mode, Mode::Retrofit);
        assert_eq!(cfg.defaults.test_cmd.as_deref(), Some("go test ./..."));
        assert_eq!(cfg.classify, ClassifyConfig::default());
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.classify.infra_patterns.push("connection refused".to_string());
        cfg.save(dir.path()).unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), cfg);
    }

    #[test]
    fn invalid_mode_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".tdd-ai.yaml"), "defaults:\n  mode: brownfield\n").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }

    #[test]
    fn validate_flags_bad_values() {
        let mut cfg = Config::default();
        cfg.version = 3;
        cfg.defaults.test_cmd = Some("  ".to_string());
        cfg.classify.summary_lines = 0;
        cfg.classify.infra_patterns = vec!["ENOSPC".to_string(), "".to_string()];

        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 4);
        assert_eq!(
            warnings
                .iter()
                .filter(|w| w.level == WarnLevel::Error)
                .count(),
            1
        );
        assert!(warnings[3].message.contains("infra_patterns[1]"));
    }
}
