//! Archive naming for size-based rollover

use std::path::PathBuf;

use chrono::NaiveDateTime;

use super::clock::sanitize_timestamp;
use super::target::LogTarget;

/// Default size at which a log file is archived (5 MiB)
pub const DEFAULT_THRESHOLD_BYTES: u64 = 5_242_880;

/// The archive produced by a rollover
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverRecord {
    /// Full path of the archived file
    pub archive_path: PathBuf,
    /// File name of the archive, as written in the "previous log" header
    pub archive_name: String,
}

/// Archive file name for `target` rolled at `stamp` (a line timestamp)
///
/// `app.log` becomes `app_<ts>.log_`; a file without an extension becomes `app_<ts>_`.
pub fn archive_name(target: &LogTarget, stamp: &str) -> String {
    archive_name_with_suffix(target, &sanitize_timestamp(stamp))
}

fn archive_name_with_suffix(target: &LogTarget, suffix: &str) -> String {
    if target.extension.is_empty() {
        format!("{}_{}_", target.stem(), suffix)
    } else {
        format!("{}_{}.{}_", target.stem(), suffix, target.extension)
    }
}

/// Pick an archive path in `target.directory` that does not exist yet
///
/// Two rollovers within the same second would otherwise collide, so a counter is
/// appended to the timestamp from the second archive on.
pub fn free_archive_path(target: &LogTarget, stamp: &str) -> RolloverRecord {
    let base = sanitize_timestamp(stamp);
    let mut name = archive_name_with_suffix(target, &base);
    let mut n = 2;
    while target.directory.join(&name).exists() {
        name = archive_name_with_suffix(target, &format!("{}-{}", base, n));
        n += 1;
    }
    RolloverRecord {
        archive_path: target.directory.join(&name),
        archive_name: name,
    }
}

/// Whether `name` is an archive of the log `target`
pub fn is_archive_of(target: &LogTarget, name: &str) -> bool {
    let prefix = format!("{}_", target.stem());
    let suffix = if target.extension.is_empty() {
        "_".to_string()
    } else {
        format!(".{}_", target.extension)
    };
    if name.len() <= prefix.len() + suffix.len()
        || !name.starts_with(&prefix)
        || !name.ends_with(&suffix)
    {
        return false;
    }
    is_archive_stamp(&name[prefix.len()..name.len() - suffix.len()])
}

/// `MM-DD-YYYY_HH.MM.SS`, optionally followed by a `-N` collision counter
fn is_archive_stamp(middle: &str) -> bool {
    const STAMP_LEN: usize = "MM-DD-YYYY_HH.MM.SS".len();
    if middle.len() < STAMP_LEN || !middle.is_char_boundary(STAMP_LEN) {
        return false;
    }
    let (stamp, counter) = middle.split_at(STAMP_LEN);
    if NaiveDateTime::parse_from_str(stamp, "%m-%d-%Y_%H.%M.%S").is_err() {
        return false;
    }
    match counter.strip_prefix('-') {
        None => counter.is_empty(),
        Some(n) => !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()),
    }
}

/// Whether a file of `size` bytes must be rolled over
pub fn needs_rollover(size: u64, threshold: u64) -> bool {
    size >= threshold
}
