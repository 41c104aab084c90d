//! Output formatting

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Print a document. Tables have no generic layout, so they fall back
    /// to JSON.
    pub fn print<T: Serialize>(&self, data: &T) -> anyhow::Result<()> {
        match self {
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(data)?),
            OutputFormat::Json | OutputFormat::Table => println!("{}", serde_json::to_string_pretty(data)?),
        }
        Ok(())
    }

    /// Print a list of rows
    pub fn print_rows<T: Serialize + Tabled>(&self, rows: &[T]) -> anyhow::Result<()> {
        match self {
            OutputFormat::Table => {
                println!("{}", Table::new(rows));
                Ok(())
            }
            _ => self.print(&rows),
        }
    }
}

pub fn success(message: &str) {
    eprintln!("{} {}", "✓".green().bold(), message);
}

pub fn warning(message: &str) {
    eprintln!("{} {}", "!".yellow().bold(), message);
}
