//! Form commands

use super::FieldRow;
use crate::output::{self, OutputFormat};
use anyhow::{anyhow, bail, Context};
use kycflow_core::{Engine, FormSession, SUBMIT_BLOCKED_MESSAGE};
use serde::Serialize;
use tabled::Tabled;

#[derive(Debug, Serialize, Tabled)]
struct PayloadRow {
    field: String,
    value: String,
}

/// Load and hydrate a form, then print it
pub async fn show(engine: &Engine, country: &str, format: OutputFormat) -> anyhow::Result<()> {
    let session = load(engine, country).await?;
    print_fields(&session, format)
}

/// Fill a form from `id=value` pairs and submit it
pub async fn fill(
    engine: &Engine,
    country: &str,
    values: &[(String, String)],
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut session = load(engine, country).await?;

    for (id, raw) in values {
        let field = session
            .configuration()
            .and_then(|c| c.field(id))
            .ok_or_else(|| anyhow!("unknown field `{}` in {} form", id, country))?;
        if field.read_only {
            bail!("field `{}` is read-only", id);
        }
        session.update_field_text(id, raw);
    }

    let payload = session.submit();
    if !session.is_submitted() {
        print_fields(&session, format)?;
        bail!("{}", session.error_message().unwrap_or(SUBMIT_BLOCKED_MESSAGE));
    }

    match format {
        OutputFormat::Table => {
            let rows: Vec<PayloadRow> = payload
                .iter()
                .map(|(field, value)| PayloadRow {
                    field: field.to_string(),
                    value: value.to_string(),
                })
                .collect();
            format.print_rows(&rows)?;
        }
        _ => format.print(&payload)?,
    }
    output::success(&format!("submitted {} fields", payload.len()));
    Ok(())
}

async fn load(engine: &Engine, country: &str) -> anyhow::Result<FormSession> {
    let mut session = engine.new_session();
    session
        .load_form(country)
        .await
        .with_context(|| format!("cannot load form for {}", country))?;

    let mut failed: Vec<&str> = session
        .state()
        .iter()
        .filter(|(_, state)| state.has_error())
        .map(|(id, _)| id)
        .collect();
    failed.sort_unstable();
    if !failed.is_empty() {
        output::warning(&format!("profile data unavailable for {}", failed.join(", ")));
    }
    Ok(session)
}

fn print_fields(session: &FormSession, format: OutputFormat) -> anyhow::Result<()> {
    match session.configuration() {
        Some(configuration) => format.print_rows(&FieldRow::collect(configuration, session.state())),
        None => Ok(()),
    }
}
