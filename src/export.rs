// src/export.rs

use std::io::Write;
use std::path::Path;

use crate::config::ExportConfig;
use crate::error::Result;
use crate::snapshot::PerformanceSnapshot;

/// Build the delimited document for `snapshots`, or `None` when there is nothing to write.
///
/// The header comes from the first snapshot alone. Every row uses the first
/// snapshot's frame-rate columns, so fixed fields stay aligned. Metadata keys
/// that only appear in later snapshots get no column, although their rows
/// still carry the `key:"value"` pairs.
pub fn render_document(
    snapshots: &[PerformanceSnapshot],
    config: &ExportConfig,
) -> Option<String> {
    let first = snapshots.first()?;
    let layout = first.frame_rate().layout();

    let mut lines = Vec::with_capacity(snapshots.len() + 1);
    lines.push(first.header());
    lines.extend(
        snapshots
            .iter()
            .map(|snapshot| snapshot.to_row_with_layout(&config.timestamp_format, layout)),
    );

    Some(lines.join("\n"))
}

/// Write `contents` as UTF-8 to `path` in one step: a sibling temp file is
/// filled, flushed and then renamed over the destination.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(contents.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
