//! KYCFlow dynamic form engine
//!
//! Country-specific KYC forms driven by declarative schema documents.
//!
//! ## Features
//! - Schema decoding with explicit and shorthand validation rules
//! - Rule chain validation with first-failure or accumulate-all reporting
//! - Per-data-source profile hydration with isolated failures
//! - Load, edit and submit sessions with stale-result cancellation
//!
//! ```no_run
//! use kycflow_core::{Engine, EngineConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = Engine::from_config(&EngineConfig::default())?;
//! let mut session = engine.new_session();
//! session.load_form("NL").await?;
//! session.update_field_text("bsn", "123456789");
//! let payload = session.submit();
//! println!("{}", payload.to_pretty_json()?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod hydration;
pub mod profile;
pub mod repository;
pub mod schema;
pub mod session;
pub mod state;
pub mod submission;
pub mod validation;

pub use config::{EngineConfig, ProfileConfig, ProfileKind};
pub use engine::Engine;
pub use error::{ConfigError, ProfileError, Result, SchemaError};
pub use hydration::{HydrationPlan, HydrationReport, LOAD_FAILED_MESSAGE};
pub use profile::{HttpProfileSource, ProfileData, ProfileRequest, ProfileSource, StaticProfileSource};
pub use repository::{
    BundledConfigurationRepository, ConfigurationRepository, FileConfigurationRepository,
    InMemoryConfigurationRepository,
};
pub use schema::{
    DataSource, DataSourceType, FieldType, FormConfiguration, FormField, RuleKind, Scalar, ValidationRule,
};
pub use session::{
    CompletedHydration, FormSession, PendingHydration, SessionPhase, SessionPolicy, SUBMIT_BLOCKED_MESSAGE,
};
pub use state::{FormFieldState, FormState};
pub use submission::SubmissionPayload;
pub use validation::{FieldOutcome, RuleOutcome, RulePolicy, ValidationEngine};
