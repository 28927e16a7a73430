//! Output formatting: JSON, YAML, key/value table.
//!
//! Miner responses are opaque JSON, so every renderer works on
//! `serde::Serialize` data; the table view flattens one level of keys.

use std::io::{self, Write};

use serde_json::Value;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::OutputFormat;

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Render any serializable response in the chosen format.
pub fn render<T: serde::Serialize + ?Sized>(format: &OutputFormat, data: &T) -> String {
    match format {
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Table => match serde_json::to_value(data) {
            Ok(value) => render_table(&value),
            Err(e) => format!("<unrenderable: {e}>"),
        },
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table(value: &Value) -> String {
    let Value::Object(map) = value else {
        return render_json(value, false);
    };
    let rows: Vec<FieldRow> = map
        .iter()
        .map(|(k, v)| FieldRow {
            field: k.clone(),
            value: scalar_text(v),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => "-".into(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_else(|e| format!("<unrenderable: {e}>"))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("<unrenderable: {e}>"))
}
