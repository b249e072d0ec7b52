use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{HarvestError, Result};
use crate::models::SnapshotRow;

/// Renders the full snapshot to a delimited artifact and a structured one,
/// both carrying identical data.
pub struct SnapshotWriter {
    csv_path: PathBuf,
    json_path: PathBuf,
}

impl SnapshotWriter {
    pub fn new(csv_path: PathBuf, json_path: PathBuf) -> Self {
        SnapshotWriter {
            csv_path,
            json_path,
        }
    }

    /// Write both artifacts. Each file lands via a `.tmp` sibling and a
    /// rename, so a crash mid-write cannot leave a torn file at the final
    /// path.
    pub fn write(&self, rows: &[SnapshotRow]) -> Result<()> {
        write_atomic(&self.csv_path, &render_csv(rows))?;
        write_atomic(&self.json_path, &render_json(rows)?)?;

        info!(
            rows = rows.len(),
            csv = %self.csv_path.display(),
            json = %self.json_path.display(),
            "snapshot written"
        );
        Ok(())
    }
}

pub fn render_csv(rows: &[SnapshotRow]) -> String {
    let mut out = String::from("id,repo_name,owner,stars,last_updated\n");
    for row in rows {
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            csv_field(&row.id),
            csv_field(&row.repo_name),
            csv_field(&row.owner),
            row.stars,
            csv_field(&row.last_updated),
        ));
    }
    out
}

pub fn render_json(rows: &[SnapshotRow]) -> Result<String> {
    serde_json::to_string_pretty(rows)
        .map_err(|e| HarvestError::ExportFailed(format!("JSON encoding failed: {}", e)))
}

/// Quote a field when it contains a delimiter, quote, or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp = tmp_path(path);
    fs::write(&tmp, contents).map_err(|e| {
        HarvestError::ExportFailed(format!("failed writing {}: {}", tmp.display(), e))
    })?;
    fs::rename(&tmp, path).map_err(|e| {
        HarvestError::ExportFailed(format!("failed moving {} into place: {}", path.display(), e))
    })?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
