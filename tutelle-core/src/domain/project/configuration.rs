// src/domain/project/configuration.rs

use crate::domain::access::configuration::PolicyConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Deployment environment. Decides whether misconfiguration halts startup
/// or degrades to deny.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl Environment {
    pub fn fails_loud(&self) -> bool {
        !matches!(self, Self::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProjectConfig {
    pub name: String,
    pub version: String,

    #[serde(default)]
    pub environment: Environment,

    /// Propagate policy misconfiguration found at evaluation time instead of
    /// denying silently.
    #[serde(default = "default_true")]
    pub strict: bool,

    #[serde(rename = "config-paths", default = "default_config_paths")]
    pub config_paths: Vec<String>,

    #[serde(rename = "fixture-paths", default = "default_fixture_paths")]
    pub fixture_paths: Vec<String>,

    #[serde(rename = "target-path", default = "default_target_path")]
    pub target_path: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask_token: Option<String>,

    /// Assembled by the loader from the built-in policy and satellite files.
    #[serde(skip)]
    pub policy: PolicyConfig,
}

fn default_true() -> bool {
    true
}
fn default_config_paths() -> Vec<String> {
    vec!["config".to_string()]
}
fn default_fixture_paths() -> Vec<String> {
    vec!["fixtures".to_string()]
}
fn default_target_path() -> String {
    "target".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_minimal_project_defaults() -> Result<()> {
        let config: ProjectConfig = serde_yaml::from_str("name: demo\nversion: '1.0'")?;
        assert_eq!(config.environment, Environment::Development);
        assert!(config.strict);
        assert_eq!(config.config_paths, vec!["config"]);
        assert_eq!(config.target_path, "target");
        Ok(())
    }

    #[test]
    fn test_only_production_degrades() {
        assert!(Environment::Development.fails_loud());
        assert!(Environment::Test.fails_loud());
        assert!(!Environment::Production.fails_loud());
        assert_eq!("PROD".parse::<Environment>(), Ok(Environment::Production));
    }
}
