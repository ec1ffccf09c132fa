// src/sink.rs

//! Durable record sink.
//!
//! Every emitted row lands in two append-only logs (one per source, one
//! aggregate) and in an in-memory tabular mirror exportable as CSV sheets.
//! Each log line is written with a single `O_APPEND` write, so a row is
//! never split across a crash and independent writers interleave at line
//! granularity.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::info;

use crate::error::Result;
use crate::models::OutputRow;
use crate::utils::slugify;

/// Table/log name receiving every row regardless of source.
pub const AGGREGATE_NAME: &str = "all_materials";

/// Column headers for exported sheets.
const SHEET_HEADERS: [&str; 4] = [
    "Work Location",
    "Source Image Location",
    "Prompt",
    "Cover Location",
];

/// Append-only log writer plus in-memory mirror.
pub struct RecordSink {
    log_dir: PathBuf,
    tables: Mutex<HashMap<String, Vec<OutputRow>>>,
}

impl RecordSink {
    /// Create a sink writing logs under `log_dir`.
    ///
    /// An unwritable destination is fatal to the whole run, so this is the
    /// one place the sink returns a setup error.
    pub fn new(log_dir: impl Into<PathBuf>) -> Result<Self> {
        let log_dir = log_dir.into();
        std::fs::create_dir_all(&log_dir)?;
        Ok(Self {
            log_dir,
            tables: Mutex::new(HashMap::new()),
        })
    }

    /// Append one row to the source's log, the aggregate log, and the
    /// in-memory mirror.
    pub fn append(&self, row: &OutputRow, source_name: &str) -> Result<()> {
        let normalized = slugify(source_name);
        let line = row.to_line();

        self.append_line(&self.log_path(&normalized), &line)?;
        self.append_line(&self.log_path(AGGREGATE_NAME), &line)?;

        let mut tables = self.tables.lock().expect("sink mirror lock poisoned");
        tables.entry(normalized).or_default().push(row.clone());
        tables
            .entry(AGGREGATE_NAME.to_string())
            .or_default()
            .push(row.clone());
        Ok(())
    }

    /// Total rows emitted this run.
    pub fn total_rows(&self) -> usize {
        let tables = self.tables.lock().expect("sink mirror lock poisoned");
        tables.get(AGGREGATE_NAME).map_or(0, Vec::len)
    }

    /// Write the mirror out as one CSV sheet per table.
    pub fn export_sheets(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let tables = self.tables.lock().expect("sink mirror lock poisoned");

        let mut exported = 0;
        for (name, rows) in tables.iter() {
            if rows.is_empty() {
                continue;
            }
            let mut sheet = String::new();
            sheet.push_str(&SHEET_HEADERS.join(","));
            sheet.push('\n');
            for row in rows {
                let line = row
                    .fields()
                    .iter()
                    .map(|f| csv_field(f))
                    .collect::<Vec<_>>()
                    .join(",");
                sheet.push_str(&line);
                sheet.push('\n');
            }
            std::fs::write(dir.join(format!("{name}.csv")), sheet)?;
            exported += 1;
        }

        info!("Exported {} sheets to {}", exported, dir.display());
        Ok(())
    }

    fn log_path(&self, normalized: &str) -> PathBuf {
        self.log_dir.join(format!("{normalized}.txt"))
    }

    /// One write per line: interleaved writers never split a row.
    fn append_line(&self, path: &Path, line: &str) -> Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(format!("{line}\n").as_bytes())?;
        Ok(())
    }
}

/// Minimal CSV quoting: fields with commas or quotes get wrapped.
fn csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NO_LOCATION;
    use tempfile::TempDir;

    fn sample_row(prompt: &str) -> OutputRow {
        OutputRow::new(
            "https://cdn.test/v.mp4".to_string(),
            None,
            Some(prompt.to_string()),
            Some("https://cdn.test/c.jpg".to_string()),
        )
    }

    #[test]
    fn appended_row_round_trips_through_the_log() {
        let tmp = TempDir::new().unwrap();
        let sink = RecordSink::new(tmp.path()).unwrap();
        let row = sample_row("A   cat\njumping\tover a fence");

        sink.append(&row, "Wan Video").unwrap();

        let log = std::fs::read_to_string(tmp.path().join("wan_video.txt")).unwrap();
        let line = log.lines().next().unwrap();
        let fields = OutputRow::parse_line(line).unwrap();
        assert_eq!(fields, row.fields());
        assert_eq!(fields[1], NO_LOCATION);
        assert_eq!(fields[2], "A cat jumping over a fence");
    }

    #[test]
    fn aggregate_log_collects_all_sources() {
        let tmp = TempDir::new().unwrap();
        let sink = RecordSink::new(tmp.path()).unwrap();

        sink.append(&sample_row("first prompt"), "Pixverse").unwrap();
        sink.append(&sample_row("second prompt"), "imagine.art").unwrap();

        let all = std::fs::read_to_string(tmp.path().join("all_materials.txt")).unwrap();
        assert_eq!(all.lines().count(), 2);
        assert!(tmp.path().join("pixverse.txt").exists());
        assert!(tmp.path().join("imagine_art.txt").exists());
        assert_eq!(sink.total_rows(), 2);
    }

    #[test]
    fn rows_keep_processing_order() {
        let tmp = TempDir::new().unwrap();
        let sink = RecordSink::new(tmp.path()).unwrap();
        for i in 0..5 {
            sink.append(&sample_row(&format!("prompt number {i}")), "Pixverse")
                .unwrap();
        }
        let log = std::fs::read_to_string(tmp.path().join("pixverse.txt")).unwrap();
        let prompts: Vec<String> = log
            .lines()
            .map(|l| OutputRow::parse_line(l).unwrap()[2].clone())
            .collect();
        assert_eq!(
            prompts,
            (0..5)
                .map(|i| format!("prompt number {i}"))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn sheets_carry_headers_and_quoted_fields() {
        let tmp = TempDir::new().unwrap();
        let sheets = TempDir::new().unwrap();
        let sink = RecordSink::new(tmp.path()).unwrap();

        sink.append(&sample_row("wide shot, golden hour, slow dolly"), "Pixverse")
            .unwrap();
        sink.export_sheets(sheets.path()).unwrap();

        let sheet = std::fs::read_to_string(sheets.path().join("pixverse.csv")).unwrap();
        let mut lines = sheet.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Work Location,Source Image Location,Prompt,Cover Location"
        );
        assert!(lines.next().unwrap().contains("\"wide shot, golden hour, slow dolly\""));
        assert!(sheets.path().join("all_materials.csv").exists());
    }
}
