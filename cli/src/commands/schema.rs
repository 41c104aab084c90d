//! Schema check command

use super::FieldRow;
use crate::output::{self, OutputFormat};
use anyhow::Context;
use kycflow_core::{schema, FormState};
use std::path::Path;

/// Decode a schema document and print its fields
pub async fn check(path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let document = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;
    let configuration = schema::decode(&document).with_context(|| format!("invalid schema {}", path.display()))?;

    format.print_rows(&FieldRow::collect(&configuration, &FormState::new()))?;
    output::success(&format!(
        "{}: {} fields, {} data sources",
        configuration.country,
        configuration.fields.len(),
        configuration.data_sources.len()
    ));
    Ok(())
}
