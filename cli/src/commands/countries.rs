//! Countries command

use crate::output::OutputFormat;
use kycflow_core::Engine;
use serde::Serialize;
use tabled::Tabled;

#[derive(Debug, Serialize, Tabled)]
pub struct CountryRow {
    pub country: String,
}

pub async fn handle(engine: &Engine, format: OutputFormat) -> anyhow::Result<()> {
    let rows: Vec<CountryRow> = engine
        .available_countries()
        .await
        .into_iter()
        .map(|country| CountryRow { country })
        .collect();
    format.print_rows(&rows)
}
