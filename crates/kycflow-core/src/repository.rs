//! Schema repositories
//!
//! Where per-country [`FormConfiguration`] documents come from. Country
//! codes are matched case-insensitively everywhere.

use crate::error::{Result, SchemaError};
use crate::schema::{self, FormConfiguration};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Schema source collaborator
#[async_trait]
pub trait ConfigurationRepository: Send + Sync {
    /// Load and decode the schema for a country
    async fn load_configuration(&self, country: &str) -> Result<FormConfiguration>;

    /// Upper-cased country codes with a schema
    async fn list_available_countries(&self) -> Result<Vec<String>>;
}

/// Decode a document, tagging failures with the country
fn decode_for(country: &str, document: &str) -> Result<FormConfiguration> {
    schema::decode(document).map_err(|e| {
        warn!(country, error = %e, "schema document failed to decode");
        SchemaError::invalid(country.to_uppercase(), e)
    })
}

/// Country codes are ASCII alphanumerics; anything else cannot name a file
fn is_country_code(country: &str) -> bool {
    !country.is_empty() && country.chars().all(|c| c.is_ascii_alphanumeric())
}

// =============================================================================
// Bundled schemas
// =============================================================================

const BUNDLED: &[(&str, &str)] = &[
    ("DE", include_str!("../schemas/de.yaml")),
    ("NL", include_str!("../schemas/nl.yaml")),
    ("US", include_str!("../schemas/us.yaml")),
];

/// Schemas compiled into the crate
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledConfigurationRepository;

impl BundledConfigurationRepository {
    pub fn new() -> Self {
        Self
    }

    /// Raw document for a country, if bundled
    pub fn document(country: &str) -> Option<&'static str> {
        BUNDLED
            .iter()
            .find(|(code, _)| code.eq_ignore_ascii_case(country))
            .map(|(_, document)| *document)
    }
}

#[async_trait]
impl ConfigurationRepository for BundledConfigurationRepository {
    async fn load_configuration(&self, country: &str) -> Result<FormConfiguration> {
        let document = Self::document(country).ok_or_else(|| SchemaError::NotFound(country.to_string()))?;
        decode_for(country, document)
    }

    async fn list_available_countries(&self) -> Result<Vec<String>> {
        Ok(BUNDLED.iter().map(|(code, _)| code.to_string()).collect())
    }
}

// =============================================================================
// Schema directory
// =============================================================================

const EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Directory of `<country>.yaml` / `.yml` / `.json` documents
#[derive(Debug, Clone)]
pub struct FileConfigurationRepository {
    dir: PathBuf,
}

impl FileConfigurationRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ConfigurationRepository for FileConfigurationRepository {
    async fn load_configuration(&self, country: &str) -> Result<FormConfiguration> {
        if !is_country_code(country) {
            return Err(SchemaError::NotFound(country.to_string()));
        }
        let stem = country.to_lowercase();

        for ext in EXTENSIONS {
            let path = self.dir.join(format!("{}.{}", stem, ext));
            match tokio::fs::read_to_string(&path).await {
                Ok(document) => {
                    debug!(path = %path.display(), "loaded schema document");
                    return decode_for(country, &document);
                }
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(SchemaError::Io(format!("{}: {}", path.display(), e))),
            }
        }
        Err(SchemaError::NotFound(country.to_string()))
    }

    async fn list_available_countries(&self) -> Result<Vec<String>> {
        let io_err = |e: std::io::Error| SchemaError::Io(format!("{}: {}", self.dir.display(), e));
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(io_err)?;

        let mut countries = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let path = entry.path();
            let known_ext = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| EXTENSIONS.contains(&e));
            if !known_ext {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if is_country_code(stem) {
                    countries.push(stem.to_uppercase());
                }
            }
        }

        countries.sort();
        countries.dedup();
        Ok(countries)
    }
}

// =============================================================================
// In-memory
// =============================================================================

#[derive(Debug, Clone)]
enum Entry {
    Document(String),
    Decoded(FormConfiguration),
}

/// In-memory schema repository (for testing and development)
#[derive(Debug, Default)]
pub struct InMemoryConfigurationRepository {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryConfigurationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a decoded configuration under its own country
    pub fn insert(&self, configuration: FormConfiguration) {
        self.entries
            .write()
            .insert(configuration.country.to_uppercase(), Entry::Decoded(configuration));
    }

    /// Store a raw document, decoded on every load
    pub fn insert_document(&self, country: &str, document: impl Into<String>) {
        self.entries
            .write()
            .insert(country.to_uppercase(), Entry::Document(document.into()));
    }

    pub fn with_configuration(self, configuration: FormConfiguration) -> Self {
        self.insert(configuration);
        self
    }
}

#[async_trait]
impl ConfigurationRepository for InMemoryConfigurationRepository {
    async fn load_configuration(&self, country: &str) -> Result<FormConfiguration> {
        let entry = self
            .entries
            .read()
            .get(&country.to_uppercase())
            .cloned()
            .ok_or_else(|| SchemaError::NotFound(country.to_string()))?;

        match entry {
            Entry::Decoded(configuration) => Ok(configuration),
            Entry::Document(document) => decode_for(country, &document),
        }
    }

    async fn list_available_countries(&self) -> Result<Vec<String>> {
        let mut countries: Vec<String> = self.entries.read().keys().cloned().collect();
        countries.sort();
        Ok(countries)
    }
}
