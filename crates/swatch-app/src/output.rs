//! Terminal output for the CLI.
#![allow(clippy::print_stdout)]

use clap::ValueEnum;
use console::Style;
use serde::Serialize;

/// Serialization format for structured output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    #[default]
    Json,
    Yaml,
}

/// Renders `value` in `format`.
pub fn render<T: Serialize>(value: &T, format: Format) -> anyhow::Result<String> {
    Ok(match format {
        Format::Json => serde_json::to_string_pretty(value)?,
        Format::Yaml => serde_yaml::to_string(value)?.trim_end().to_string(),
    })
}

pub fn emit<T: Serialize>(value: &T, format: Format) -> anyhow::Result<()> {
    println!("{}", render(value, format)?);
    Ok(())
}

pub fn line(text: impl AsRef<str>) {
    println!("{}", text.as_ref());
}

pub fn heading(text: &str) -> String {
    Style::new().bold().apply_to(text).to_string()
}

pub fn dim(text: &str) -> String {
    Style::new().dim().apply_to(text).to_string()
}

pub fn ok(text: &str) -> String {
    Style::new().green().apply_to(text).to_string()
}

pub fn fail(text: &str) -> String {
    Style::new().red().bold().apply_to(text).to_string()
}
