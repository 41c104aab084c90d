//! Profile sources
//!
//! A [`ProfileSource`] supplies remote values for fields bound to `api`
//! data sources. Two request shapes are supported: keyed by country, or
//! by endpoint plus the requested field ids.

use crate::error::ProfileError;
use crate::schema::Scalar;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Fetched values by field id. `None` marks a field the source knows
/// about but has no value for; the engine treats it like an omitted key.
pub type ProfileData = HashMap<String, Option<Scalar>>;

/// What to fetch
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProfileRequest {
    /// Whole profile for a country
    Country(String),
    /// Selected fields from an endpoint
    Endpoint { endpoint: String, fields: Vec<String> },
}

impl ProfileRequest {
    /// Field ids explicitly requested; empty for country requests
    pub fn requested_fields(&self) -> &[String] {
        match self {
            ProfileRequest::Country(_) => &[],
            ProfileRequest::Endpoint { fields, .. } => fields,
        }
    }

    /// Country code or endpoint path
    pub fn key(&self) -> &str {
        match self {
            ProfileRequest::Country(country) => country,
            ProfileRequest::Endpoint { endpoint, .. } => endpoint,
        }
    }
}

/// External profile capability
///
/// Called once per data source per hydration run, with no retry and no
/// timeout on the engine side.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_profile(&self, request: &ProfileRequest) -> Result<ProfileData, ProfileError>;
}

/// Map a JSON profile object to profile data.
///
/// With requested fields, every requested id gets an entry (explicit
/// `None` when absent); otherwise every scalar key is returned.
pub fn profile_from_json(object: &Map<String, Value>, fields: &[String]) -> ProfileData {
    if fields.is_empty() {
        object
            .iter()
            .map(|(key, value)| (key.clone(), scalar_entry(key, value)))
            .collect()
    } else {
        fields
            .iter()
            .map(|field| (field.clone(), object.get(field).and_then(|v| scalar_entry(field, v))))
            .collect()
    }
}

fn scalar_entry(key: &str, value: &Value) -> Option<Scalar> {
    if matches!(value, Value::Array(_) | Value::Object(_)) {
        tracing::debug!(field = key, "dropping non-scalar profile value");
    }
    Scalar::from_json(value)
}

// =============================================================================
// Static source
// =============================================================================

/// Serves one fixed profile
///
/// Restricted to the registered endpoints and countries; with none
/// registered it answers every request.
#[derive(Debug, Clone, Default)]
pub struct StaticProfileSource {
    profile: Map<String, Value>,
    endpoints: HashSet<String>,
    countries: HashSet<String>,
    latency: Option<Duration>,
}

impl StaticProfileSource {
    pub fn new(profile: Map<String, Value>) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    /// Parse a JSON object document
    pub fn from_json_str(json: &str) -> Result<Self, ProfileError> {
        match serde_json::from_str::<Value>(json) {
            Ok(Value::Object(profile)) => Ok(Self::new(profile)),
            Ok(_) => Err(ProfileError::Decode("expected a JSON object".into())),
            Err(e) => Err(ProfileError::Decode(e.to_string())),
        }
    }

    /// Demo profile served for the Dutch user-profile endpoint
    pub fn demo() -> Self {
        let mut profile = Map::new();
        profile.insert("first_name".into(), Value::from("Jan"));
        profile.insert("last_name".into(), Value::from("van der Berg"));
        profile.insert("birth_date".into(), Value::from("1985-03-15"));

        Self::new(profile)
            .with_endpoint("/api/nl-user-profile")
            .with_country("NL")
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoints.insert(endpoint.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.countries.insert(country.into().to_uppercase());
        self
    }

    /// Delay every response, to exercise loading states
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn serves(&self, request: &ProfileRequest) -> bool {
        if self.endpoints.is_empty() && self.countries.is_empty() {
            return true;
        }
        match request {
            ProfileRequest::Country(country) => self.countries.contains(&country.to_uppercase()),
            ProfileRequest::Endpoint { endpoint, .. } => self.endpoints.contains(endpoint),
        }
    }
}

#[async_trait]
impl ProfileSource for StaticProfileSource {
    async fn fetch_profile(&self, request: &ProfileRequest) -> Result<ProfileData, ProfileError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if !self.serves(request) {
            return Err(ProfileError::UnsupportedKey(request.key().to_string()));
        }
        Ok(profile_from_json(&self.profile, request.requested_fields()))
    }
}

// =============================================================================
// HTTP source
// =============================================================================

/// Fetches profiles from an HTTP API returning a JSON object
///
/// Endpoint requests GET `{base_url}{endpoint}`; country requests GET
/// `{base_url}/profiles/{country}`.
#[derive(Debug, Clone)]
pub struct HttpProfileSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpProfileSource {
    pub fn new(base_url: &str) -> Result<Self, ProfileError> {
        Self::build(base_url, reqwest::Client::builder())
    }

    /// Client with a per-request timeout
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ProfileError> {
        Self::build(base_url, reqwest::Client::builder().timeout(timeout))
    }

    fn build(base_url: &str, builder: reqwest::ClientBuilder) -> Result<Self, ProfileError> {
        let client = builder.build().map_err(|e| ProfileError::Transport(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url_for(&self, request: &ProfileRequest) -> String {
        match request {
            ProfileRequest::Country(country) => {
                format!("{}/profiles/{}", self.base_url, country.to_lowercase())
            }
            ProfileRequest::Endpoint { endpoint, .. } if endpoint.starts_with('/') => {
                format!("{}{}", self.base_url, endpoint)
            }
            ProfileRequest::Endpoint { endpoint, .. } => format!("{}/{}", self.base_url, endpoint),
        }
    }
}

#[async_trait]
impl ProfileSource for HttpProfileSource {
    async fn fetch_profile(&self, request: &ProfileRequest) -> Result<ProfileData, ProfileError> {
        let url = self.url_for(request);
        tracing::debug!(%url, "fetching profile");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProfileError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProfileError::Status(status.as_u16()));
        }

        let body: Value = resp.json().await.map_err(|e| ProfileError::Decode(e.to_string()))?;
        match body {
            Value::Object(object) => Ok(profile_from_json(&object, request.requested_fields())),
            _ => Err(ProfileError::Decode("expected a JSON object".into())),
        }
    }
}
