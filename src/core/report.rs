//! Console rendering of records.
//!
//! The text format is a JSON-shaped block with two-decimal numbers. The JSON
//! format is strict serde_json output for machine consumers.

use crate::core::record::{FieldValue, Record};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Output style for console reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl ReportFormat {
    /// Parse a format name, defaulting to text for unknown names.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "json" => ReportFormat::Json,
            _ => ReportFormat::Text,
        }
    }
}

/// Renders records for the console.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a reporter for the given format.
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Output style in use.
    pub fn format(&self) -> ReportFormat {
        self.format
    }

    /// Render a record under an optional title.
    ///
    /// An empty title renders the block alone.
    pub fn render(&self, title: &str, record: &Record) -> String {
        let mut out = String::new();
        if !title.is_empty() {
            out.push_str(title);
            out.push('\n');
        }

        match self.format {
            ReportFormat::Text => out.push_str(&render_text(record)),
            ReportFormat::Json => {
                let json = serde_json::to_string_pretty(record)
                    .unwrap_or_else(|_| render_text(record));
                out.push_str(&json);
            }
        }
        out.push('\n');
        out
    }

    /// Render and write to a console sink.
    pub fn emit<W: Write>(&self, out: &mut W, title: &str, record: &Record) -> io::Result<()> {
        out.write_all(self.render(title, record).as_bytes())?;
        out.flush()
    }
}

fn render_text(record: &Record) -> String {
    let mut out = String::from("{\n");
    let last = record.len().saturating_sub(1);

    for (i, (key, value)) in record.iter().enumerate() {
        let comma = if i < last { "," } else { "" };
        let rendered = match value {
            FieldValue::Number(v) => format!("{v:.2}"),
            FieldValue::Integer(v) => format!("{:.2}", *v as f64),
            FieldValue::Text(v) => quote(v),
        };
        out.push_str(&format!("    {}: {rendered}{comma}\n", quote(key)));
    }

    out.push('}');
    out
}

/// Quote with JSON string escaping so the block stays JSON-shaped.
fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        let mut record = Record::new();
        record.insert("temperature", 21.5);
        record.insert("cpu_core_count", 8u64);
        record.insert("os", "Linux");
        record
    }

    #[test]
    fn test_text_render() {
        let reporter = Reporter::new(ReportFormat::Text);
        let rendered = reporter.render("", &sample());

        assert_eq!(
            rendered,
            "{\n    \"temperature\": 21.50,\n    \"cpu_core_count\": 8.00,\n    \"os\": \"Linux\"\n}\n"
        );
    }

    #[test]
    fn test_title_is_first_line() {
        let reporter = Reporter::default();
        let rendered = reporter.render("System info:", &sample());
        assert!(rendered.starts_with("System info:\n{\n"));
    }

    #[test]
    fn test_empty_record() {
        let reporter = Reporter::default();
        assert_eq!(reporter.render("", &Record::new()), "{\n}\n");
    }

    #[test]
    fn test_text_render_escapes_quotes() {
        let mut record = Record::new();
        record.insert("cpu_type", r#"ACME "Turbo" 9000"#);
        record.insert("path", r"C:\mission");

        let rendered = Reporter::default().render("", &record);
        assert!(rendered.contains(r#""cpu_type": "ACME \"Turbo\" 9000""#));
        assert!(rendered.contains(r#""path": "C:\\mission""#));

        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["cpu_type"], r#"ACME "Turbo" 9000"#);
    }

    #[test]
    fn test_json_render_is_parseable() {
        let reporter = Reporter::new(ReportFormat::Json);
        let rendered = reporter.render("", &sample());

        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["temperature"], 21.5);
        assert_eq!(value["cpu_core_count"], 8);
        assert_eq!(value["os"], "Linux");
    }

    #[test]
    fn test_emit_writes_to_sink() {
        let reporter = Reporter::default();
        let mut sink: Vec<u8> = Vec::new();
        reporter.emit(&mut sink, "Title", &sample()).unwrap();

        let text = String::from_utf8(sink).unwrap();
        assert!(text.contains("\"os\": \"Linux\""));
    }

    #[test]
    fn test_format_from_name() {
        assert_eq!(ReportFormat::from_name("JSON"), ReportFormat::Json);
        assert_eq!(ReportFormat::from_name("text"), ReportFormat::Text);
        assert_eq!(ReportFormat::from_name("other"), ReportFormat::Text);
    }
}
