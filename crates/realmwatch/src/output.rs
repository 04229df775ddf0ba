//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders reports in the format selected by `--output`. Tables use
//! `tabled`, structured formats use serde, plain emits one value per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use realmwatch_core::Mode;

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Mode name, colored when enabled: branded in bold green, default dimmed.
pub fn paint_mode(mode: Mode, color: bool) -> String {
    match (mode, color) {
        (_, false) => mode.to_string(),
        (Mode::Branded, true) => mode.to_string().green().bold().to_string(),
        (Mode::Default, true) => mode.to_string().dimmed().to_string(),
    }
}

/// Yes/no marker, colored when enabled.
pub fn paint_flag(ok: bool, color: bool) -> String {
    let text = if ok { "yes" } else { "no" };
    match (ok, color) {
        (_, false) => text.to_owned(),
        (true, true) => text.green().to_string(),
        (false, true) => text.red().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering shows `detail_fn`'s field/value pairs in a two-column
/// table.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> Vec<(&'static str, String)>,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => render_fields(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
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

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn render_fields(fields: Vec<(&'static str, String)>) -> String {
    let rows: Vec<FieldRow> = fields
        .into_iter()
        .map(|(field, value)| FieldRow { field, value })
        .collect();
    render_table(&rows)
}

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Pretty-printed JSON.
pub(crate) fn render_json_pretty<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).expect("serialization should not fail")
}

/// Compact single-line JSON.
pub(crate) fn render_json_compact<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string(data).expect("serialization should not fail")
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    if compact {
        render_json_compact(data)
    } else {
        render_json_pretty(data)
    }
}

/// YAML output.
pub(crate) fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).expect("serialization should not fail")
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Sample {
        realm: String,
    }

    fn sample() -> Sample {
        Sample {
            realm: "sony.net".into(),
        }
    }

    #[test]
    fn plain_uses_id_fn() {
        let out = render_single(
            &OutputFormat::Plain,
            &sample(),
            |_| Vec::new(),
            |s| s.realm.clone(),
        );
        assert_eq!(out, "sony.net");
    }

    #[test]
    fn compact_json_is_one_line() {
        let out = render_single(
            &OutputFormat::JsonCompact,
            &sample(),
            |_| Vec::new(),
            |_| String::new(),
        );
        assert_eq!(out, r#"{"realm":"sony.net"}"#);
    }

    #[test]
    fn table_lists_fields() {
        let out = render_single(
            &OutputFormat::Table,
            &sample(),
            |s| vec![("Realm", s.realm.clone())],
            |_| String::new(),
        );
        assert!(out.contains("Realm"));
        assert!(out.contains("sony.net"));
    }

    #[test]
    fn uncolored_mode_is_plain_text() {
        assert_eq!(paint_mode(Mode::Branded, false), "branded");
        assert_eq!(paint_flag(false, false), "no");
    }
}
