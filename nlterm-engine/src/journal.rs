// ABOUTME: appends one json line per history entry to an optional on-disk journal.
// ABOUTME: commands and requests are redacted before they are written.

use std::path::Path;

use anyhow::Context;
use nlterm_common::HistoryEntry;
use tokio::io::AsyncWriteExt;

use crate::redact::sanitize_for_display;

pub async fn append_entry(journal_path: &Path, entry: &HistoryEntry) -> anyhow::Result<()> {
    let record = redact_entry(entry);

    let mut line = serde_json::to_vec(&record)?;
    line.push(b'\n');

    if let Some(parent) = journal_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create journal dir {}", parent.display()))?;
        }
    }

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(journal_path)
        .await
        .with_context(|| format!("open journal at {}", journal_path.display()))?;

    file.write_all(&line).await?;
    file.flush().await?;
    Ok(())
}

fn redact_entry(entry: &HistoryEntry) -> HistoryEntry {
    HistoryEntry {
        natural_language: sanitize_for_display(&entry.natural_language),
        shell_command: sanitize_for_display(&entry.shell_command),
        ..entry.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlterm_common::HistoryStatus;

    #[tokio::test]
    async fn appends_one_line_per_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("journal.jsonl");

        let first = HistoryEntry::new("list files", "ls -la", "total 0", HistoryStatus::Success);
        let second = HistoryEntry::new("login", "psql password=hunter2", "", HistoryStatus::Error);
        append_entry(&path, &first).await.unwrap();
        append_entry(&path, &second).await.unwrap();

        let text = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let v: HistoryEntry = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(v, first);

        let redacted: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(redacted["shellCommand"], "psql password=***");
        assert_eq!(redacted["id"], second.id.as_str());
    }
}
