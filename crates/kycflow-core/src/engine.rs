//! Composition root
//!
//! Builds the collaborators once and hands them to every session.

use crate::config::{EngineConfig, ProfileKind};
use crate::error::ConfigError;
use crate::profile::{HttpProfileSource, ProfileSource, StaticProfileSource};
use crate::repository::{BundledConfigurationRepository, ConfigurationRepository, FileConfigurationRepository};
use crate::session::{FormSession, SessionPolicy};
use crate::validation::ValidationEngine;
use std::sync::Arc;
use tracing::{info, warn};

/// Constructed collaborators shared by sessions
#[derive(Clone)]
pub struct Engine {
    repository: Arc<dyn ConfigurationRepository>,
    profiles: Arc<dyn ProfileSource>,
    validator: ValidationEngine,
    policy: SessionPolicy,
    fallback_countries: Vec<String>,
}

impl Engine {
    pub fn new(
        repository: Arc<dyn ConfigurationRepository>,
        profiles: Arc<dyn ProfileSource>,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            repository,
            profiles,
            validator: ValidationEngine::new(policy.rule_policy()),
            policy,
            fallback_countries: EngineConfig::default().fallback_countries,
        }
    }

    /// Build collaborators from configuration
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        let repository: Arc<dyn ConfigurationRepository> = match &config.schema_dir {
            Some(dir) => {
                info!(dir = %dir.display(), "using schema directory");
                Arc::new(FileConfigurationRepository::new(dir))
            }
            None => Arc::new(BundledConfigurationRepository::new()),
        };

        let profiles: Arc<dyn ProfileSource> = match config.profile.kind {
            ProfileKind::Static => Arc::new(StaticProfileSource::demo()),
            ProfileKind::Http => {
                let base_url = config
                    .profile
                    .base_url
                    .as_deref()
                    .ok_or_else(|| ConfigError::Invalid("http profile source needs base_url".into()))?;
                let source = match config.profile.timeout() {
                    Some(timeout) => HttpProfileSource::with_timeout(base_url, timeout),
                    None => HttpProfileSource::new(base_url),
                }
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
                info!(base_url, "using http profile source");
                Arc::new(source)
            }
        };

        Ok(Self::new(repository, profiles, config.session_policy)
            .with_fallback_countries(config.fallback_countries.clone()))
    }

    /// Replace the profile source, keeping everything else
    pub fn with_profile_source(mut self, profiles: Arc<dyn ProfileSource>) -> Self {
        self.profiles = profiles;
        self
    }

    /// Replace the validator handed to new sessions
    pub fn with_validator(mut self, validator: ValidationEngine) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_fallback_countries(mut self, countries: Vec<String>) -> Self {
        self.fallback_countries = countries;
        self
    }

    /// Fresh session wired to this engine's collaborators
    pub fn new_session(&self) -> FormSession {
        FormSession::with_validator(
            Arc::clone(&self.repository),
            Arc::clone(&self.profiles),
            self.policy,
            self.validator,
        )
    }

    /// Countries with a schema, sorted. Falls back to the configured list
    /// when the schema source cannot be listed.
    pub async fn available_countries(&self) -> Vec<String> {
        match self.repository.list_available_countries().await {
            Ok(mut countries) => {
                countries.sort();
                countries
            }
            Err(e) => {
                warn!(error = %e, "cannot list countries, using fallback list");
                let mut countries = self.fallback_countries.clone();
                countries.sort();
                countries
            }
        }
    }

    pub fn repository(&self) -> &Arc<dyn ConfigurationRepository> {
        &self.repository
    }

    pub fn profiles(&self) -> &Arc<dyn ProfileSource> {
        &self.profiles
    }

    /// Evaluator handed to every new session
    pub fn validator(&self) -> &ValidationEngine {
        &self.validator
    }

    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("policy", &self.policy)
            .field("validator", &self.validator)
            .field("fallback_countries", &self.fallback_countries)
            .finish_non_exhaustive()
    }
}
