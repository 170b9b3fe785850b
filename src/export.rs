// Snapshot rendering and the CSV export contract

use crate::store::TemplateRecord;
use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use std::fs;
use std::path::Path;

/// Two-column CSV, every field quoted, embedded quotes doubled. The header
/// spelling and the snapshot ordering are part of the compatibility
/// contract for downstream consumers.
pub fn to_csv(records: &[TemplateRecord]) -> String {
    let mut out = String::from("Template ID,Template Name");
    for record in records {
        out.push('\n');
        out.push_str(&quote(&record.id));
        out.push(',');
        out.push_str(&quote(&record.name));
    }
    out
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// `LegalHoldTemplates_<UTC timestamp>.csv`, filesystem-safe
pub fn default_csv_filename() -> String {
    let stamp = Utc::now()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("LegalHoldTemplates_{}.csv", stamp)
}

pub fn write_csv(records: &[TemplateRecord], path: &Path) -> Result<()> {
    fs::write(path, to_csv(records))?;
    Ok(())
}

pub fn to_json(records: &[TemplateRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Unknown names render as an em dash in the table; CSV and JSON keep the
/// empty string.
pub fn render_table(records: &[TemplateRecord]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Template ID", "Template Name"]);

    for record in records {
        let name = if record.name.is_empty() {
            "—"
        } else {
            record.name.as_str()
        };
        table.add_row(vec![record.id.as_str(), name]);
    }
    table
}

pub fn print_summary(count: usize) {
    println!(
        "{} {} template(s) known",
        "✓".green(),
        count.to_string().bold()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str) -> TemplateRecord {
        TemplateRecord {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_csv_contract() {
        let records = vec![
            record("T-1", "Litigation Hold"),
            record("T-2", ""),
            record("T-3", "Say \"Cheese\""),
        ];

        let csv = to_csv(&records);
        let expected = concat!(
            "Template ID,Template Name\n",
            "\"T-1\",\"Litigation Hold\"\n",
            "\"T-2\",\"\"\n",
            "\"T-3\",\"Say \"\"Cheese\"\"\"",
        );
        assert_eq!(csv, expected);
    }

    #[test]
    fn test_csv_header_only_when_empty() {
        assert_eq!(to_csv(&[]), "Template ID,Template Name");
    }

    #[test]
    fn test_default_filename_shape() {
        let name = default_csv_filename();
        assert!(name.starts_with("LegalHoldTemplates_"));
        assert!(name.ends_with(".csv"));
        assert!(!name.contains(':'));
        assert!(!name.contains(' '));
    }

    #[test]
    fn test_json_output() {
        let json = to_json(&[record("T-1", "Hold")]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["id"], "T-1");
        assert_eq!(parsed[0]["name"], "Hold");
    }

    #[test]
    fn test_table_renders_placeholder_for_unknown() {
        let table = render_table(&[record("T-1", "")]).to_string();
        assert!(table.contains("Template ID"));
        assert!(table.contains("T-1"));
        assert!(table.contains('—'));
    }

    #[test]
    fn test_write_csv_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&[record("T-1", "Hold")], &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, to_csv(&[record("T-1", "Hold")]));
    }
}
