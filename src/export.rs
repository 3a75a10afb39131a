//! CSV export of lap sequences, live or archived.

use chrono::{DateTime, Local};
use itertools::Itertools;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::goal::GoalConfig;
use crate::session::Session;
use crate::timer::Lap;
use crate::util::{format_delta_secs, format_time};

pub const CSV_HEADERS: [&str; 5] = ["Lap #", "Time", "Goal", "Delta (s)", "Status"];

/// Render laps as CSV. Status and the goal column are derived from `goal`,
/// the deltas come from the laps as recorded. Fields are never quoted;
/// every value is numeric or a fixed label.
pub fn to_csv(laps: &[Lap], goal: GoalConfig) -> String {
    let goal_cell = if goal.is_set() {
        format_time(goal.goal_ms as i64)
    } else {
        "-".to_string()
    };

    let header = CSV_HEADERS.join(",");
    let rows = laps.iter().enumerate().map(|(i, lap)| {
        [
            (i + 1).to_string(),
            format_time(lap.lap_time as i64),
            goal_cell.clone(),
            format_delta_secs(lap.delta),
            goal.status(lap.delta).to_string(),
        ]
        .join(",")
    });

    std::iter::once(header).chain(rows).join("\n")
}

pub fn live_export_filename(now: DateTime<Local>) -> String {
    format!("lap_session_{}.csv", now.timestamp_millis())
}

pub fn session_export_filename(session: &Session) -> String {
    format!("session_{}.csv", session.date.replace([':', ' '], "_"))
}

/// A row of a previously exported CSV
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CsvLapRow {
    #[serde(rename = "Lap #")]
    pub lap_no: usize,
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Goal")]
    pub goal: String,
    #[serde(rename = "Delta (s)")]
    pub delta_secs: f64,
    #[serde(rename = "Status")]
    pub status: String,
}

impl CsvLapRow {
    pub fn delta_ms(&self) -> i64 {
        (self.delta_secs * 1000.0).round() as i64
    }
}

pub fn parse_csv(text: &str) -> Result<Vec<CsvLapRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let rows = reader
        .deserialize::<CsvLapRow>()
        .collect::<std::result::Result<Vec<_>, csv::Error>>()?;
    Ok(rows)
}

/// Destination for exported files
pub trait ExportSink {
    fn write_file(&self, name: &str, content: &str) -> Result<PathBuf>;
}

/// Writes exports into a directory, creating it on first use
#[derive(Debug, Clone)]
pub struct DirExportSink {
    dir: PathBuf,
}

impl DirExportSink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for DirExportSink {
    fn write_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);
        fs::write(&path, content)?;
        info!("exported {} bytes to {}", content.len(), path.display());
        Ok(path)
    }
}
