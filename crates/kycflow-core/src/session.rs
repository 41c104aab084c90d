//! Form session controller
//!
//! Owns one load-edit-submit lifecycle:
//!
//! ```text
//! Empty -> Loading -> Loaded <-> Editing -> Submitting -> Submitted
//!                       ^                        |
//!                       +------ (invalid) -------+
//! ```
//!
//! A session is driven from a single task. Hydration can be split off with
//! [`FormSession::begin_load`] so the fetch runs elsewhere while the
//! session stays usable; results issued for an earlier load or before a
//! [`reset`](FormSession::reset) are dropped on
//! [`apply_hydration`](FormSession::apply_hydration).

use crate::error::Result;
use crate::hydration::{HydrationPlan, HydrationReport};
use crate::profile::ProfileSource;
use crate::repository::ConfigurationRepository;
use crate::schema::{FormConfiguration, FormField, Scalar};
use crate::state::{FormFieldState, FormState};
use crate::submission::SubmissionPayload;
use crate::validation::{RulePolicy, ValidationEngine};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Form-level message when submit finds invalid fields
pub const SUBMIT_BLOCKED_MESSAGE: &str = "Please fix all errors before submitting";

/// When and how a session validates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPolicy {
    /// Validate on submit only, skip read-only fields, report every
    /// failing rule
    #[default]
    SubmitTime,
    /// Validate on every edit, include read-only fields, report the first
    /// failing rule
    Immediate,
}

impl SessionPolicy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "submit_time" => Some(Self::SubmitTime),
            "immediate" => Some(Self::Immediate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubmitTime => "submit_time",
            Self::Immediate => "immediate",
        }
    }

    /// Rule chain policy paired with this session policy
    pub fn rule_policy(&self) -> RulePolicy {
        match self {
            Self::SubmitTime => RulePolicy::AccumulateAll,
            Self::Immediate => RulePolicy::FirstFailure,
        }
    }

    pub fn validates_on_edit(&self) -> bool {
        matches!(self, Self::Immediate)
    }

    pub fn validates_read_only(&self) -> bool {
        matches!(self, Self::Immediate)
    }
}

impl fmt::Display for SessionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Empty,
    Loading,
    Loaded,
    Editing,
    Submitting,
    Submitted,
}

/// Hydration work detached from a session
///
/// Owns everything it needs, so it can be moved to another task.
#[derive(Debug)]
#[must_use = "hydration does nothing unless run and applied"]
pub struct PendingHydration {
    generation: u64,
    plan: HydrationPlan,
}

impl PendingHydration {
    pub fn country(&self) -> &str {
        self.plan.country()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_empty(&self) -> bool {
        self.plan.is_empty()
    }

    /// Fetch every group
    pub async fn run(self, source: &dyn ProfileSource) -> CompletedHydration {
        CompletedHydration {
            generation: self.generation,
            report: self.plan.fetch(source).await,
        }
    }
}

/// Fetched hydration results awaiting [`FormSession::apply_hydration`]
#[derive(Debug)]
pub struct CompletedHydration {
    generation: u64,
    report: HydrationReport,
}

impl CompletedHydration {
    pub fn country(&self) -> &str {
        self.report.country()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn report(&self) -> &HydrationReport {
        &self.report
    }
}

/// One load-edit-submit lifecycle for a country's form
pub struct FormSession {
    repository: Arc<dyn ConfigurationRepository>,
    profiles: Arc<dyn ProfileSource>,
    validator: ValidationEngine,
    policy: SessionPolicy,

    phase: SessionPhase,
    configuration: Option<FormConfiguration>,
    state: FormState,
    error_message: Option<String>,
    submitted: Option<SubmissionPayload>,
    generation: u64,
}

impl FormSession {
    /// Session using the rule policy paired with `policy`
    pub fn new(
        repository: Arc<dyn ConfigurationRepository>,
        profiles: Arc<dyn ProfileSource>,
        policy: SessionPolicy,
    ) -> Self {
        Self::with_validator(repository, profiles, policy, ValidationEngine::new(policy.rule_policy()))
    }

    /// Session evaluating rules with a given validator
    pub fn with_validator(
        repository: Arc<dyn ConfigurationRepository>,
        profiles: Arc<dyn ProfileSource>,
        policy: SessionPolicy,
        validator: ValidationEngine,
    ) -> Self {
        Self {
            repository,
            profiles,
            validator,
            policy,
            phase: SessionPhase::Empty,
            configuration: None,
            state: FormState::new(),
            error_message: None,
            submitted: None,
            generation: 0,
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Load a country's form and hydrate it from the profile source.
    ///
    /// A schema failure is also recorded as the session's error message.
    pub async fn load_form(&mut self, country: &str) -> Result<()> {
        let pending = self.begin_load(country).await?;
        let profiles = Arc::clone(&self.profiles);
        let completed = pending.run(profiles.as_ref()).await;
        self.apply_hydration(completed);
        Ok(())
    }

    /// Load and decode the schema, initialize state and flag hydrated
    /// fields as loading. The returned work must be run and applied to
    /// finish the load.
    pub async fn begin_load(&mut self, country: &str) -> Result<PendingHydration> {
        self.generation += 1;
        self.phase = SessionPhase::Loading;
        self.configuration = None;
        self.state = FormState::new();
        self.submitted = None;
        self.error_message = None;

        let generation = self.generation;
        info!(country, generation, "loading form");
        let configuration = match self.repository.load_configuration(country).await {
            Ok(configuration) => configuration,
            Err(e) => {
                warn!(country, error = %e, "form load failed");
                self.phase = SessionPhase::Empty;
                self.error_message = Some(format!("Failed to load form: {}", e));
                return Err(e);
            }
        };

        let plan = HydrationPlan::for_configuration(&configuration);
        let mut state = FormState::initialize(&configuration);
        plan.mark_loading(&mut state);

        self.state = state;
        self.configuration = Some(configuration);

        Ok(PendingHydration { generation, plan })
    }

    /// Merge hydration results. Returns `false` when they belong to an
    /// earlier load or the session was reset, in which case nothing changes.
    pub fn apply_hydration(&mut self, completed: CompletedHydration) -> bool {
        let current_country = self.configuration.as_ref().map(|c| c.country.as_str());
        if completed.generation != self.generation || current_country != Some(completed.country()) {
            debug!(
                country = completed.country(),
                generation = completed.generation,
                current = self.generation,
                "discarding stale hydration"
            );
            return false;
        }

        let failed = completed.report.failed_sources().len();
        completed.report.apply(&mut self.state);
        if self.phase == SessionPhase::Loading {
            self.phase = SessionPhase::Loaded;
        }
        info!(
            country = current_country.unwrap_or_default(),
            failed_sources = failed,
            "form loaded"
        );
        true
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Set a field's value, clearing its errors. Under the immediate policy
    /// the field is validated straight away.
    pub fn update_field(&mut self, id: &str, value: Option<Scalar>) {
        self.state.set_value(id, value);
        if matches!(self.phase, SessionPhase::Loaded | SessionPhase::Submitted) {
            self.phase = SessionPhase::Editing;
        }
        if self.policy.validates_on_edit() {
            self.validate_field(id);
        }
    }

    /// Set a field from raw user text, typed for the field. Empty input
    /// clears the value.
    pub fn update_field_text(&mut self, id: &str, raw: &str) {
        let value = if raw.is_empty() {
            None
        } else {
            let field_type = self.field(id).map(|f| f.field_type).unwrap_or_default();
            Some(Scalar::parse_for(field_type, raw))
        };
        self.update_field(id, value);
    }

    // =========================================================================
    // Validation and submit
    // =========================================================================

    /// Validate one schema field and store its messages. Unknown ids are
    /// valid.
    pub fn validate_field(&mut self, id: &str) -> bool {
        let Some(field) = self.configuration.as_ref().and_then(|c| c.field(id)) else {
            return true;
        };
        let outcome = self.validator.evaluate_field(field, self.state.value(id));
        let valid = outcome.valid;
        self.state.set_error(id, outcome.messages);
        valid
    }

    /// Validate every field in schema order
    pub fn validate_all(&mut self) -> bool {
        let Some(configuration) = self.configuration.as_ref() else {
            return false;
        };

        let mut all_valid = true;
        for field in &configuration.fields {
            if field.read_only && !self.policy.validates_read_only() {
                continue;
            }
            let outcome = self.validator.evaluate_field(field, self.state.value(&field.id));
            all_valid &= outcome.valid;
            self.state.set_error(&field.id, outcome.messages);
        }
        all_valid
    }

    /// Validate and, when everything passes, build and store the payload.
    ///
    /// Returns an empty payload when the form is invalid or not loaded. A
    /// session without a form reports [`SUBMIT_BLOCKED_MESSAGE`] unless a
    /// load error is already recorded.
    pub fn submit(&mut self) -> SubmissionPayload {
        if self.configuration.is_none() {
            if self.error_message.is_none() {
                self.error_message = Some(SUBMIT_BLOCKED_MESSAGE.to_string());
            }
            info!("submission blocked, no form loaded");
            return SubmissionPayload::default();
        }

        self.phase = SessionPhase::Submitting;

        if !self.validate_all() {
            self.phase = SessionPhase::Loaded;
            self.error_message = Some(SUBMIT_BLOCKED_MESSAGE.to_string());
            info!("submission blocked by validation errors");
            return SubmissionPayload::default();
        }

        let payload = match self.configuration.as_ref() {
            Some(configuration) => SubmissionPayload::collect(configuration, &self.state),
            None => SubmissionPayload::default(),
        };
        info!(fields = payload.len(), "form submitted");

        self.submitted = Some(payload.clone());
        self.error_message = None;
        self.phase = SessionPhase::Submitted;
        payload
    }

    /// Back to an empty session. In-flight hydration is invalidated.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.phase = SessionPhase::Empty;
        self.configuration = None;
        self.state = FormState::new();
        self.error_message = None;
        self.submitted = None;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    pub fn validator(&self) -> &ValidationEngine {
        &self.validator
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn configuration(&self) -> Option<&FormConfiguration> {
        self.configuration.as_ref()
    }

    pub fn has_configuration(&self) -> bool {
        self.configuration.is_some()
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn field_state(&self, id: &str) -> Option<&FormFieldState> {
        self.state.get(id)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.phase == SessionPhase::Loading || self.state.any_loading()
    }

    pub fn is_submitted(&self) -> bool {
        self.phase == SessionPhase::Submitted
    }

    /// Payload of the last successful submit
    pub fn submitted_payload(&self) -> Option<&SubmissionPayload> {
        self.submitted.as_ref()
    }

    /// Whether the submit action should be offered
    pub fn can_submit(&self) -> bool {
        let Some(configuration) = self.configuration.as_ref() else {
            return false;
        };
        if self.is_loading() {
            return false;
        }
        match self.policy {
            SessionPolicy::SubmitTime => configuration
                .fields
                .iter()
                .filter(|f| f.required)
                .all(|f| self.state.value(&f.id).is_some_and(|v| !v.is_blank())),
            SessionPolicy::Immediate => !self.state.has_errors(),
        }
    }

    fn field(&self, id: &str) -> Option<&FormField> {
        self.configuration.as_ref().and_then(|c| c.field(id))
    }
}

impl fmt::Debug for FormSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormSession")
            .field("policy", &self.policy)
            .field("phase", &self.phase)
            .field("country", &self.configuration.as_ref().map(|c| &c.country))
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydration::LOAD_FAILED_MESSAGE;
    use crate::profile::StaticProfileSource;
    use crate::repository::{BundledConfigurationRepository, InMemoryConfigurationRepository};
    use crate::schema::{DataSource, FieldType, ValidationRule};
    use crate::validation::REQUIRED_MESSAGE;
    use std::time::Duration;

    fn session_with(config: FormConfiguration, policy: SessionPolicy) -> FormSession {
        let repo = InMemoryConfigurationRepository::new().with_configuration(config);
        FormSession::new(Arc::new(repo), Arc::new(StaticProfileSource::demo()), policy)
    }

    fn bundled(policy: SessionPolicy) -> FormSession {
        FormSession::new(
            Arc::new(BundledConfigurationRepository),
            Arc::new(StaticProfileSource::demo()),
            policy,
        )
    }

    #[tokio::test]
    async fn test_submit_with_missing_required_value() {
        let config = FormConfiguration::new("XX").with_field(FormField::new("name", "Name", FieldType::Text).required());
        let mut session = session_with(config, SessionPolicy::SubmitTime);
        session.load_form("XX").await.unwrap();
        assert_eq!(session.phase(), SessionPhase::Loaded);

        let payload = session.submit();
        assert!(payload.is_empty());
        assert_eq!(session.field_state("name").unwrap().errors, vec![REQUIRED_MESSAGE]);
        assert_eq!(session.error_message(), Some(SUBMIT_BLOCKED_MESSAGE));
        assert_eq!(session.phase(), SessionPhase::Loaded);
        assert!(session.submitted_payload().is_none());
    }

    #[tokio::test]
    async fn test_submit_regex_then_fix() {
        let config = FormConfiguration::new("NL").with_field(
            FormField::new("bsn", "BSN", FieldType::Text)
                .required()
                .with_rule(ValidationRule::regex(r"^\d{9}$").with_message("BSN must be 9 digits")),
        );
        let mut session = session_with(config, SessionPolicy::SubmitTime);
        session.load_form("NL").await.unwrap();

        session.update_field_text("bsn", "12345");
        assert!(session.field_state("bsn").unwrap().errors.is_empty());
        assert!(session.submit().is_empty());
        assert_eq!(session.field_state("bsn").unwrap().errors, vec!["BSN must be 9 digits"]);

        session.update_field_text("bsn", "123456789");
        assert!(session.field_state("bsn").unwrap().errors.is_empty());
        let payload = session.submit();
        assert_eq!(payload.get("bsn"), Some(&Scalar::from("123456789")));
        assert_eq!(payload.len(), 1);
        assert!(session.is_submitted());
        assert!(session.error_message().is_none());
        assert_eq!(session.submitted_payload(), Some(&payload));
    }

    #[tokio::test]
    async fn test_load_hydrates_from_profile() {
        let config = FormConfiguration::new("NL")
            .with_data_source(DataSource::api("user_profile", Some("/api/nl-user-profile")).supplying(["first_name"]))
            .with_field(FormField::new("first_name", "First Name", FieldType::Text).bound_to("user_profile"));
        let mut session = session_with(config, SessionPolicy::SubmitTime);
        session.load_form("nl").await.unwrap();

        let first = session.field_state("first_name").unwrap();
        assert_eq!(first.value, Some(Scalar::from("Jan")));
        assert!(!first.is_loading);
        assert!(first.errors.is_empty());
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_age_bounds_under_immediate_policy() {
        let config = FormConfiguration::new("US").with_field(
            FormField::new("age", "Age", FieldType::Number)
                .required()
                .with_rule(ValidationRule::min_value(18.0))
                .with_rule(ValidationRule::max_value(100.0)),
        );
        let mut session = session_with(config, SessionPolicy::Immediate);
        session.load_form("US").await.unwrap();

        for (raw, valid) in [("17", false), ("18", true), ("100", true), ("101", false)] {
            session.update_field_text("age", raw);
            assert_eq!(session.field_state("age").unwrap().is_valid(), valid, "age {}", raw);
        }
        assert_eq!(session.phase(), SessionPhase::Editing);
    }

    #[tokio::test]
    async fn test_bundled_nl_end_to_end() {
        let mut session = bundled(SessionPolicy::SubmitTime);
        session.load_form("NL").await.unwrap();

        let birth = session.field_state("birth_date").unwrap();
        assert_eq!(birth.value, Some(Scalar::Date("1985-03-15".into())));
        assert!(birth.is_read_only);
        assert!(!session.can_submit());

        session.update_field_text("bsn", "123456789");
        assert!(session.can_submit());
        let payload = session.submit();
        assert_eq!(
            payload.keys().collect::<Vec<_>>(),
            vec!["birth_date", "bsn", "first_name", "last_name"]
        );
        assert_eq!(payload.display_value("last_name").as_deref(), Some("van der Berg"));
    }

    #[tokio::test]
    async fn test_load_failure_leaves_no_configuration() {
        let mut session = bundled(SessionPolicy::SubmitTime);
        session.load_form("NL").await.unwrap();

        let err = session.load_form("FR").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(!session.has_configuration());
        assert!(session.state().is_empty());
        assert_eq!(session.phase(), SessionPhase::Empty);
        assert!(session.error_message().unwrap().starts_with("Failed to load form"));
        assert!(session.submit().is_empty());
    }

    #[tokio::test]
    async fn test_submit_time_skips_read_only_fields() {
        // DE profile is not served, so hydrated read-only fields carry load errors
        let config = FormConfiguration::new("DE")
            .with_data_source(DataSource::api("profile", None))
            .with_field(FormField::new("name", "Name", FieldType::Text).required().read_only().bound_to("profile"))
            .with_field(FormField::new("city", "City", FieldType::Text));

        let mut lenient = session_with(config.clone(), SessionPolicy::SubmitTime);
        lenient.load_form("DE").await.unwrap();
        assert_eq!(lenient.field_state("name").unwrap().errors, vec![LOAD_FAILED_MESSAGE]);
        assert!(lenient.validate_all());

        let mut strict = session_with(config, SessionPolicy::Immediate);
        strict.load_form("DE").await.unwrap();
        assert!(!strict.validate_all());
        assert_eq!(strict.field_state("name").unwrap().errors, vec![REQUIRED_MESSAGE]);
        assert!(!strict.can_submit());
    }

    #[tokio::test]
    async fn test_policies_report_messages_differently() {
        let field = FormField::new("code", "Code", FieldType::Text)
            .required()
            .with_rule(ValidationRule::min_length(5).with_message("too short"))
            .with_rule(ValidationRule::regex(r"^\d+$").with_message("digits only"));
        let config = FormConfiguration::new("XX").with_field(field);

        let mut submit_time = session_with(config.clone(), SessionPolicy::SubmitTime);
        submit_time.load_form("XX").await.unwrap();
        submit_time.update_field_text("code", "ab");
        assert!(submit_time.field_state("code").unwrap().is_valid());
        submit_time.submit();
        assert_eq!(
            submit_time.field_state("code").unwrap().error_text().as_deref(),
            Some("too short\ndigits only")
        );

        let mut immediate = session_with(config, SessionPolicy::Immediate);
        immediate.load_form("XX").await.unwrap();
        immediate.update_field_text("code", "ab");
        assert_eq!(immediate.field_state("code").unwrap().errors, vec!["too short"]);
    }

    #[tokio::test]
    async fn test_stale_hydration_discarded() {
        let mut session = bundled(SessionPolicy::SubmitTime);
        let pending = session.begin_load("NL").await.unwrap();
        assert_eq!(session.phase(), SessionPhase::Loading);
        assert!(session.field_state("first_name").unwrap().is_loading);

        let source = StaticProfileSource::demo();
        let completed = pending.run(&source).await;

        session.load_form("US").await.unwrap();
        assert!(!session.apply_hydration(completed));
        assert_eq!(session.configuration().unwrap().country, "US");
        assert!(session.field_state("first_name").unwrap().value.is_none());
    }

    #[tokio::test]
    async fn test_reset_invalidates_in_flight_hydration() {
        let mut session = bundled(SessionPolicy::SubmitTime);
        let pending = session.begin_load("NL").await.unwrap();

        let source = StaticProfileSource::demo().with_latency(Duration::from_millis(20));
        let task = tokio::spawn(async move { pending.run(&source).await });

        session.reset();
        let completed = task.await.unwrap();
        assert!(!session.apply_hydration(completed));
        assert_eq!(session.phase(), SessionPhase::Empty);
        assert!(session.state().is_empty());
    }

    #[tokio::test]
    async fn test_same_country_reload_drops_first_run() {
        let mut session = bundled(SessionPolicy::SubmitTime);
        let first = session.begin_load("NL").await.unwrap();
        let second = session.begin_load("NL").await.unwrap();
        let source = StaticProfileSource::demo();

        let stale = first.run(&source).await;
        assert!(!session.apply_hydration(stale));
        assert!(session.is_loading());

        assert!(session.apply_hydration(second.run(&source).await));
        assert_eq!(session.phase(), SessionPhase::Loaded);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_edit_after_submit_keeps_payload() {
        let mut session = bundled(SessionPolicy::SubmitTime);
        session.load_form("NL").await.unwrap();
        session.update_field_text("bsn", "123456789");
        session.submit();

        session.update_field_text("bsn", "");
        assert_eq!(session.phase(), SessionPhase::Editing);
        assert!(session.submitted_payload().is_some());
        assert!(session.submit().is_empty());
        assert_eq!(session.error_message(), Some(SUBMIT_BLOCKED_MESSAGE));
    }

    #[test]
    fn test_submit_without_form_sets_error() {
        let mut session = bundled(SessionPolicy::SubmitTime);
        assert!(session.submit().is_empty());
        assert_eq!(session.error_message(), Some(SUBMIT_BLOCKED_MESSAGE));
        assert_eq!(session.phase(), SessionPhase::Empty);
        assert!(session.submitted_payload().is_none());
    }

    #[tokio::test]
    async fn test_submit_keeps_load_error() {
        let mut session = bundled(SessionPolicy::SubmitTime);
        let _ = session.load_form("FR").await;
        session.submit();
        assert!(session.error_message().unwrap().starts_with("Failed to load form"));
    }

    #[tokio::test]
    async fn test_optional_field_rules_run_when_empty() {
        let config = FormConfiguration::new("XX")
            .with_field(FormField::new("name", "Name", FieldType::Text).required())
            .with_field(
                FormField::new("email", "Email", FieldType::Text)
                    .with_rule(ValidationRule::regex("@").with_message("Enter a valid email address")),
            );
        let mut session = session_with(config, SessionPolicy::SubmitTime);
        session.load_form("XX").await.unwrap();
        session.update_field_text("name", "Jan");

        assert!(session.submit().is_empty());
        assert_eq!(session.field_state("email").unwrap().errors, vec!["Enter a valid email address"]);

        session.update_field_text("email", "jan@example.nl");
        assert_eq!(session.submit().len(), 2);
    }

    #[tokio::test]
    async fn test_bundled_us_submits_without_email() {
        let mut session = bundled(SessionPolicy::Immediate);
        session.load_form("US").await.unwrap();
        for (id, raw) in [("first_name", "Ann"), ("last_name", "Lee"), ("ssn", "123-45-6789"), ("age", "30")] {
            session.update_field_text(id, raw);
        }
        assert!(session.can_submit());
        let payload = session.submit();
        assert!(session.is_submitted());
        assert!(payload.get("email").is_none());
        assert_eq!(payload.get("age"), Some(&Scalar::Number(30.0)));
    }

    #[test]
    fn test_custom_validator() {
        let repo = Arc::new(InMemoryConfigurationRepository::new());
        let session = FormSession::with_validator(
            repo,
            Arc::new(StaticProfileSource::demo()),
            SessionPolicy::SubmitTime,
            ValidationEngine::new(RulePolicy::FirstFailure),
        );
        assert_eq!(session.validator().policy(), RulePolicy::FirstFailure);
        assert_eq!(session.policy(), SessionPolicy::SubmitTime);
    }

    #[test]
    fn test_policy_names() {
        assert_eq!(SessionPolicy::from_name("immediate"), Some(SessionPolicy::Immediate));
        assert_eq!(SessionPolicy::from_name("Submit-Time"), Some(SessionPolicy::SubmitTime));
        assert_eq!(SessionPolicy::from_name("eager"), None);
        assert_eq!(SessionPolicy::default().rule_policy(), RulePolicy::AccumulateAll);
    }
}
