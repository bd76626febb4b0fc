// ABOUTME: writes the session history as a pretty-printed json array for download or archiving.
// ABOUTME: file names carry the export date so repeated exports do not collide across days.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use nlterm_common::{export_history_json, parse_history_json, HistoryEntry};

pub fn export_file_name(date: NaiveDate) -> String {
    format!("terminal-history-{}.json", date.format("%Y-%m-%d"))
}

pub async fn write_export(dir: &Path, entries: &[HistoryEntry]) -> anyhow::Result<PathBuf> {
    let path = dir.join(export_file_name(chrono::Local::now().date_naive()));
    let json = export_history_json(entries)?;
    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("write history export to {}", path.display()))?;
    Ok(path)
}

pub async fn read_export(path: &Path) -> anyhow::Result<Vec<HistoryEntry>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read history export {}", path.display()))?;
    Ok(parse_history_json(&text)?)
}
