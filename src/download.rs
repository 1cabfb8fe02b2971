use crate::util::ensure_dir;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes `bytes` under `out_dir` as `filename` through a transient `.part`
/// handle: acquire, write once, release on every exit path. A failed write
/// never leaves the partial handle behind. `mime_type` has no filesystem
/// meaning and is only recorded in the log.
pub fn trigger_download(
    bytes: &[u8],
    filename: &str,
    mime_type: &str,
    out_dir: &Path,
) -> Result<PathBuf> {
    ensure_dir(out_dir)?;
    let final_path = out_dir.join(filename);
    let part_path = out_dir.join(format!(".{filename}.part"));

    let result = write_and_promote(bytes, &part_path, &final_path);
    if result.is_err() {
        let _ = std::fs::remove_file(&part_path);
    }
    let path = result?;

    info!("saved {} ({} bytes, {})", path.display(), bytes.len(), mime_type);
    Ok(path)
}

fn write_and_promote(bytes: &[u8], part: &Path, final_path: &Path) -> Result<PathBuf> {
    let mut file = std::fs::File::create(part)
        .with_context(|| format!("create {}", part.display()))?;
    file.write_all(bytes).with_context(|| "writing download bytes")?;
    file.sync_all().with_context(|| "flushing download bytes")?;
    drop(file);
    std::fs::rename(part, final_path)
        .with_context(|| format!("promote {}", final_path.display()))?;
    Ok(final_path.to_path_buf())
}
