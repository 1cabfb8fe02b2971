use anyhow::{Context, Result};
use std::path::Path;
use time::macros::format_description;
use time::OffsetDateTime;

pub fn ensure_dir(p: &Path) -> Result<()> {
    std::fs::create_dir_all(p).with_context(|| format!("create_dir_all {}", p.display()))
}

/// `{prefix}_{timestamp}.{extension}` where the timestamp is the current UTC
/// instant truncated to whole seconds, with `-` in place of the ISO-8601
/// `:`/`T` separators. Two calls within the same second collide; second
/// resolution is the only uniqueness on offer.
pub fn make_filename(prefix: &str, extension: &str) -> String {
    make_filename_at(prefix, extension, OffsetDateTime::now_utc())
}

pub fn make_filename_at(prefix: &str, extension: &str, at: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day]-[hour]-[minute]-[second]");
    let stamp = at
        .format(&format)
        .unwrap_or_else(|_| "1970-01-01-00-00-00".to_string());
    format!("{prefix}_{stamp}.{extension}")
}
