//! Hydration coordinator
//!
//! Groups fields by their `api` data source, fetches each group from a
//! [`ProfileSource`] and merges the results into [`FormState`]. Groups are
//! fetched concurrently and fail independently.
//!
//! The work is split so that fetching owns no form state:
//!
//! 1. [`HydrationPlan::for_configuration`] resolves the groups,
//! 2. [`HydrationPlan::mark_loading`] flags their fields,
//! 3. [`HydrationPlan::fetch`] runs every group's request,
//! 4. [`HydrationReport::apply`] merges outcomes and clears the flags.

use crate::error::ProfileError;
use crate::profile::{ProfileData, ProfileRequest, ProfileSource};
use crate::schema::{DataSource, FieldType, FormConfiguration};
use crate::state::FormState;
use futures_util::future::join_all;
use tracing::{debug, info, warn};

/// Error recorded on every field of a group whose fetch failed
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load data";

/// Fields served by one `api` data source
#[derive(Debug, Clone, PartialEq)]
pub struct HydrationGroup {
    pub source_id: String,
    pub fields: Vec<(String, FieldType)>,
    pub request: ProfileRequest,
}

impl HydrationGroup {
    pub fn field_ids(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(id, _)| id.as_str())
    }
}

/// Resolved hydration work for one configuration
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HydrationPlan {
    country: String,
    groups: Vec<HydrationGroup>,
}

impl HydrationPlan {
    /// Group bound fields by data source, keeping `api` sources only.
    ///
    /// Bindings to undeclared sources are skipped.
    pub fn for_configuration(configuration: &FormConfiguration) -> Self {
        let mut bindings: Vec<(&str, Vec<(String, FieldType)>)> = Vec::new();
        for field in &configuration.fields {
            let Some(source_id) = field.data_source_id.as_deref() else {
                continue;
            };
            let entry = (field.id.clone(), field.field_type);
            match bindings.iter_mut().find(|(id, _)| *id == source_id) {
                Some((_, fields)) => fields.push(entry),
                None => bindings.push((source_id, vec![entry])),
            }
        }

        let groups = bindings
            .into_iter()
            .filter_map(|(source_id, fields)| {
                let Some(source) = configuration.data_source(source_id) else {
                    warn!(source = source_id, "fields bound to undeclared data source");
                    return None;
                };
                if !source.is_api() {
                    debug!(source = source_id, "manual data source, not hydrated");
                    return None;
                }
                let request = request_for(source, &fields, &configuration.country);
                Some(HydrationGroup {
                    source_id: source_id.to_string(),
                    fields,
                    request,
                })
            })
            .collect();

        Self {
            country: configuration.country.clone(),
            groups,
        }
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn groups(&self) -> &[HydrationGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Flag every field of every group as loading
    pub fn mark_loading(&self, state: &mut FormState) {
        for id in self.groups.iter().flat_map(HydrationGroup::field_ids) {
            state.set_loading(id, true);
        }
    }

    /// Fetch all groups concurrently; one attempt each
    pub async fn fetch(self, source: &dyn ProfileSource) -> HydrationReport {
        let country = self.country;
        let fetches = self.groups.into_iter().map(|group| async move {
            info!(source = %group.source_id, key = group.request.key(), fields = group.fields.len(), "hydrating data source");
            let outcome = source.fetch_profile(&group.request).await;
            if let Err(e) = &outcome {
                warn!(source = %group.source_id, error = %e, "data source failed to load");
            }
            GroupResult { group, outcome }
        });

        HydrationReport {
            country,
            results: join_all(fetches).await,
        }
    }
}

/// Request shape for a source: by endpoint when it has one, else by country
fn request_for(source: &DataSource, fields: &[(String, FieldType)], country: &str) -> ProfileRequest {
    match &source.endpoint {
        Some(endpoint) => {
            let mut requested = source.fields.clone();
            for (id, _) in fields {
                if !requested.contains(id) {
                    requested.push(id.clone());
                }
            }
            ProfileRequest::Endpoint {
                endpoint: endpoint.clone(),
                fields: requested,
            }
        }
        None => ProfileRequest::Country(country.to_string()),
    }
}

/// Outcome of one group's fetch
#[derive(Debug, Clone)]
pub struct GroupResult {
    pub group: HydrationGroup,
    pub outcome: Result<ProfileData, ProfileError>,
}

/// Outcomes of a hydration run, not yet merged
#[derive(Debug, Clone)]
pub struct HydrationReport {
    country: String,
    results: Vec<GroupResult>,
}

impl HydrationReport {
    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn results(&self) -> &[GroupResult] {
        &self.results
    }

    /// Ids of sources whose fetch failed
    pub fn failed_sources(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.outcome.is_err())
            .map(|r| r.group.source_id.as_str())
            .collect()
    }

    /// Merge into form state and clear loading flags.
    ///
    /// Missing or null entries leave the field's value untouched; a failed
    /// group gets [`LOAD_FAILED_MESSAGE`] on each field.
    pub fn apply(self, state: &mut FormState) {
        for result in self.results {
            match result.outcome {
                Ok(mut data) => {
                    for (id, field_type) in &result.group.fields {
                        if let Some(Some(value)) = data.remove(id) {
                            state.set_value(id, Some(value.conform(*field_type)));
                        }
                    }
                }
                Err(_) => {
                    for id in result.group.field_ids() {
                        state.set_error(id, vec![LOAD_FAILED_MESSAGE.to_string()]);
                    }
                }
            }
            for id in result.group.field_ids() {
                state.set_loading(id, false);
            }
        }
    }
}

/// Run a whole hydration pass against `state`
pub async fn hydrate(configuration: &FormConfiguration, state: &mut FormState, source: &dyn ProfileSource) {
    let plan = HydrationPlan::for_configuration(configuration);
    if plan.is_empty() {
        return;
    }
    plan.mark_loading(state);
    plan.fetch(source).await.apply(state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FormField, Scalar};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Answers per endpoint; unknown endpoints fail
    struct ScriptedSource {
        responses: Vec<(&'static str, ProfileData)>,
        seen: Mutex<Vec<ProfileRequest>>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<(&'static str, ProfileData)>) -> Self {
            Self {
                responses,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ProfileSource for ScriptedSource {
        async fn fetch_profile(&self, request: &ProfileRequest) -> Result<ProfileData, ProfileError> {
            self.seen.lock().push(request.clone());
            self.responses
                .iter()
                .find(|(key, _)| *key == request.key())
                .map(|(_, data)| data.clone())
                .ok_or_else(|| ProfileError::Transport("connection refused".into()))
        }
    }

    fn data(entries: &[(&str, Option<Scalar>)]) -> ProfileData {
        entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn two_source_config() -> FormConfiguration {
        FormConfiguration::new("NL")
            .with_data_source(DataSource::api("a", Some("/a")).supplying(["a1", "a2"]))
            .with_data_source(DataSource::api("b", Some("/b")).supplying(["b1"]))
            .with_data_source(DataSource::manual("m").supplying(["m1"]))
            .with_field(FormField::new("a1", "A1", FieldType::Text).bound_to("a"))
            .with_field(FormField::new("a2", "A2", FieldType::Text).bound_to("a"))
            .with_field(FormField::new("b1", "B1", FieldType::Date).bound_to("b"))
            .with_field(FormField::new("m1", "M1", FieldType::Text).bound_to("m"))
            .with_field(FormField::new("free", "Free", FieldType::Text))
    }

    #[test]
    fn test_plan_groups_api_sources_only() {
        let plan = HydrationPlan::for_configuration(&two_source_config());
        let ids: Vec<_> = plan.groups().iter().map(|g| g.source_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(
            plan.groups()[0].request,
            ProfileRequest::Endpoint {
                endpoint: "/a".into(),
                fields: vec!["a1".into(), "a2".into()],
            }
        );
    }

    #[test]
    fn test_plan_skips_undeclared_source_and_uses_country_key() {
        let config = FormConfiguration::new("DE")
            .with_data_source(DataSource::api("profile", None))
            .with_field(FormField::new("x", "X", FieldType::Text).bound_to("profile"))
            .with_field(FormField::new("y", "Y", FieldType::Text).bound_to("ghost"));

        let plan = HydrationPlan::for_configuration(&config);
        assert_eq!(plan.groups().len(), 1);
        assert_eq!(plan.groups()[0].request, ProfileRequest::Country("DE".into()));
    }

    #[tokio::test]
    async fn test_failure_is_isolated_per_source() {
        let config = two_source_config();
        let mut state = FormState::initialize(&config);
        let source = ScriptedSource::new(vec![(
            "/b",
            data(&[("b1", Some(Scalar::from("1985-03-15")))]),
        )]);

        hydrate(&config, &mut state, &source).await;

        for id in ["a1", "a2"] {
            let field = state.get(id).unwrap();
            assert_eq!(field.errors, vec![LOAD_FAILED_MESSAGE]);
            assert!(field.value.is_none());
            assert!(!field.is_loading);
        }

        let b1 = state.get("b1").unwrap();
        assert_eq!(b1.value, Some(Scalar::Date("1985-03-15".into())));
        assert!(b1.errors.is_empty());
        assert!(!b1.is_loading);

        for id in ["m1", "free"] {
            let field = state.get(id).unwrap();
            assert!(field.value.is_none());
            assert!(field.errors.is_empty());
            assert!(!field.is_loading);
        }
        assert_eq!(source.seen.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_and_null_entries_leave_value_untouched() {
        let config = two_source_config();
        let mut state = FormState::initialize(&config);
        state.set_value("a2", Some(Scalar::from("kept")));

        let source = ScriptedSource::new(vec![
            ("/a", data(&[("a1", Some(Scalar::from("Jan"))), ("a2", None)])),
            ("/b", data(&[])),
        ]);
        hydrate(&config, &mut state, &source).await;

        assert_eq!(state.value("a1"), Some(&Scalar::from("Jan")));
        assert_eq!(state.value("a2"), Some(&Scalar::from("kept")));
        assert!(state.value("b1").is_none());
        assert!(!state.any_loading());
    }

    #[tokio::test]
    async fn test_loading_flags_between_mark_and_apply() {
        let config = two_source_config();
        let mut state = FormState::initialize(&config);
        let plan = HydrationPlan::for_configuration(&config);

        plan.mark_loading(&mut state);
        assert!(state.get("a1").unwrap().is_loading);
        assert!(state.get("b1").unwrap().is_loading);
        assert!(!state.get("m1").unwrap().is_loading);

        let source = ScriptedSource::new(vec![]);
        let report = plan.fetch(&source).await;
        assert_eq!(report.failed_sources(), vec!["a", "b"]);
        report.apply(&mut state);
        assert!(!state.any_loading());
    }
}
