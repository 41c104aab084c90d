//! Engine configuration
//!
//! Read from a TOML file; a missing file means defaults. A few keys can be
//! overridden from the environment:
//!
//! | variable              | key                |
//! |-----------------------|--------------------|
//! | `KYCFLOW_SCHEMA_DIR`  | `schema_dir`       |
//! | `KYCFLOW_POLICY`      | `session_policy`   |
//! | `KYCFLOW_PROFILE_URL` | `profile.base_url` (and `profile.kind = "http"`) |

use crate::error::ConfigError;
use crate::session::SessionPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_SCHEMA_DIR: &str = "KYCFLOW_SCHEMA_DIR";
pub const ENV_POLICY: &str = "KYCFLOW_POLICY";
pub const ENV_PROFILE_URL: &str = "KYCFLOW_PROFILE_URL";

/// Profile collaborator selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    /// Built-in demo profile
    #[default]
    Static,
    Http,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub kind: ProfileKind,
    pub base_url: Option<String>,
    /// Per-request timeout for the HTTP source
    pub timeout_ms: Option<u64>,
}

impl ProfileConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Schema directory; bundled schemas when unset
    pub schema_dir: Option<PathBuf>,
    pub session_policy: SessionPolicy,
    /// Countries offered when the schema source cannot list its own
    pub fallback_countries: Vec<String>,
    pub profile: ProfileConfig,
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            schema_dir: None,
            session_policy: SessionPolicy::default(),
            fallback_countries: vec!["DE".into(), "NL".into(), "US".into()],
            profile: ProfileConfig::default(),
            log_filter: "info".into(),
        }
    }
}

impl EngineConfig {
    /// Load from a file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `KYCFLOW_*` variables from the process environment
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any variable lookup
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_SCHEMA_DIR).filter(|v| !v.is_empty()) {
            self.schema_dir = Some(PathBuf::from(dir));
        }
        if let Some(name) = lookup(ENV_POLICY).filter(|v| !v.is_empty()) {
            self.session_policy = SessionPolicy::from_name(&name)
                .ok_or_else(|| ConfigError::Invalid(format!("{}: unknown session policy `{}`", ENV_POLICY, name)))?;
        }
        if let Some(url) = lookup(ENV_PROFILE_URL).filter(|v| !v.is_empty()) {
            self.profile.kind = ProfileKind::Http;
            self.profile.base_url = Some(url);
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.profile.kind == ProfileKind::Http && self.profile.base_url.is_none() {
            return Err(ConfigError::Invalid("profile.kind = \"http\" requires profile.base_url".into()));
        }
        if self.profile.timeout_ms == Some(0) {
            return Err(ConfigError::Invalid("profile.timeout_ms must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.session_policy, SessionPolicy::SubmitTime);
        assert_eq!(config.fallback_countries, vec!["DE", "NL", "US"]);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_parse() {
        let config = EngineConfig::from_toml_str(
            r#"
            schema_dir = "/etc/kycflow/schemas"
            session_policy = "immediate"
            fallback_countries = ["NL"]

            [profile]
            kind = "http"
            base_url = "https://profiles.internal"
            timeout_ms = 2500
            "#,
        )
        .unwrap();

        assert_eq!(config.schema_dir.as_deref(), Some(Path::new("/etc/kycflow/schemas")));
        assert_eq!(config.session_policy, SessionPolicy::Immediate);
        assert_eq!(config.profile.kind, ProfileKind::Http);
        assert_eq!(config.profile.timeout(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(
            EngineConfig::from_toml_str("[profile]\nkind = \"http\"\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("session_policy = \"eager\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_SCHEMA_DIR, "/tmp/schemas"),
            (ENV_POLICY, "immediate"),
            (ENV_PROFILE_URL, "http://localhost:8080"),
        ]
        .into_iter()
        .collect();

        let config = EngineConfig::default()
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.schema_dir, Some(PathBuf::from("/tmp/schemas")));
        assert_eq!(config.session_policy, SessionPolicy::Immediate);
        assert_eq!(config.profile.kind, ProfileKind::Http);
        assert_eq!(config.profile.base_url.as_deref(), Some("http://localhost:8080"));

        let bad = EngineConfig::default().apply_overrides(|key| (key == ENV_POLICY).then(|| "never".to_string()));
        assert!(matches!(bad, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load(&dir.path().join("kycflow.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());

        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "log_filter = \"debug\"\n").unwrap();
        assert_eq!(EngineConfig::load(&path).unwrap().log_filter, "debug");
    }
}
