//! Log file rotation and numbered path discovery.
//!
//! A log path is never overwritten: if something already lives at the
//! target path it is first moved to `<stem>-N.<ext>`, with N the first
//! free number. When the stem already ends in `-N`, numbering continues
//! from N+1 under the shorter stem.

use crate::error::{LogError, LogResult};
use crate::store::LogStore;
use std::path::{Path, PathBuf};
use tracing::info;

/// Upper bound when scanning for the highest numbered log
pub const MAX_NUMBERED_SCAN: u64 = 999;

fn numbered_file_name(stem: &str, n: u64, extension: Option<&str>) -> String {
    match extension {
        Some(ext) => format!("{stem}-{n}.{ext}"),
        None => format!("{stem}-{n}"),
    }
}

/// Split a file stem into its base and the first rotation number to try
fn rotation_base(stem: &str) -> (&str, u64) {
    match stem.rsplit_once('-') {
        Some((base, suffix)) => match suffix.parse::<u64>() {
            Ok(n) => (base, n.saturating_add(1)),
            Err(_) => (stem, 1),
        },
        None => (stem, 1),
    }
}

/// Path that `path` is moved to when rotated into slot `n`
#[must_use]
pub fn rotated_path(path: &Path, n: u64) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path.extension().map(|e| e.to_string_lossy().into_owned());
    let (base, _) = rotation_base(&stem);
    path.with_file_name(numbered_file_name(base, n, extension.as_deref()))
}

/// Move an existing file at `path` out of the way.
///
/// Returns the path it was moved to, or `None` if nothing was there.
///
/// # Errors
///
/// Returns error if the rename fails or no free slot exists
pub fn rotate_existing<S: LogStore>(store: &S, path: &Path) -> LogResult<Option<PathBuf>> {
    if !store.exists(path) {
        return Ok(None);
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (_, start) = rotation_base(&stem);

    let target = (start..=u64::MAX)
        .map(|n| rotated_path(path, n))
        .find(|candidate| !store.exists(candidate))
        .ok_or_else(|| LogError::RotationExhausted {
            path: path.to_path_buf(),
        })?;

    store.rename(path, &target)?;
    info!(
        from = %path.display(),
        to = %target.display(),
        "Rotated existing log"
    );
    Ok(Some(target))
}

/// Next path in a contiguous `<stem>-1.<ext>`, `<stem>-2.<ext>`, ... series.
///
/// Scans upward from 1 while files exist (at most [`MAX_NUMBERED_SCAN`])
/// and returns the slot after the last one found.
#[must_use]
pub fn next_numbered_path<S: LogStore>(
    store: &S,
    dir: &Path,
    stem: &str,
    extension: &str,
) -> PathBuf {
    let slot = |n: u64| dir.join(numbered_file_name(stem, n, Some(extension)));
    let highest = (1..=MAX_NUMBERED_SCAN)
        .take_while(|n| store.exists(&slot(*n)))
        .last()
        .unwrap_or(0);
    slot(highest + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryLogStore;

    #[test]
    fn test_rotation_base() {
        assert_eq!(rotation_base("78"), ("78", 1));
        assert_eq!(rotation_base("78-1"), ("78", 2));
        assert_eq!(rotation_base("game-replay"), ("game-replay", 1));
        assert_eq!(rotation_base("game-replay-3"), ("game-replay", 4));
    }

    #[test]
    fn test_rotated_path() {
        assert_eq!(
            rotated_path(Path::new("logs/run.log"), 2),
            PathBuf::from("logs/run-2.log")
        );
        assert_eq!(
            rotated_path(Path::new("logs/run-4.log"), 5),
            PathBuf::from("logs/run-5.log")
        );
        assert_eq!(rotated_path(Path::new("plain"), 1), PathBuf::from("plain-1"));
    }

    #[test]
    fn test_rotate_nothing_there() {
        let store = MemoryLogStore::new();
        assert_eq!(rotate_existing(&store, Path::new("run.log")).unwrap(), None);
    }

    #[test]
    fn test_rotate_first_free_slot() {
        let store = MemoryLogStore::new();
        store.insert("run.log", "current").unwrap();
        store.insert("run-1.log", "older").unwrap();

        let moved = rotate_existing(&store, Path::new("run.log")).unwrap();
        assert_eq!(moved, Some(PathBuf::from("run-2.log")));
        assert_eq!(store.contents("run-2.log").unwrap(), "current");
        assert_eq!(store.contents("run-1.log").unwrap(), "older");
        assert!(!store.exists(Path::new("run.log")));
    }

    #[test]
    fn test_rotate_numbered_continues_series() {
        let store = MemoryLogStore::new();
        store.insert("78-1.log", "first").unwrap();
        store.insert("78-2.log", "second").unwrap();

        let moved = rotate_existing(&store, Path::new("78-1.log")).unwrap();
        assert_eq!(moved, Some(PathBuf::from("78-3.log")));
        assert_eq!(store.contents("78-3.log").unwrap(), "first");
        assert_eq!(store.contents("78-2.log").unwrap(), "second");
    }

    #[test]
    fn test_next_numbered_path() {
        let store = MemoryLogStore::new();
        let dir = Path::new("baselines");
        assert_eq!(
            next_numbered_path(&store, dir, "t-replay", "log"),
            PathBuf::from("baselines/t-replay-1.log")
        );

        store.insert("baselines/t-replay-1.log", "").unwrap();
        store.insert("baselines/t-replay-2.log", "").unwrap();
        store.insert("baselines/t-replay-4.log", "").unwrap();
        assert_eq!(
            next_numbered_path(&store, dir, "t-replay", "log"),
            PathBuf::from("baselines/t-replay-3.log")
        );
    }

    #[test]
    fn test_next_numbered_in_current_dir() {
        let store = MemoryLogStore::new();
        assert_eq!(
            next_numbered_path(&store, Path::new(""), "session", "log"),
            PathBuf::from("session-1.log")
        );
    }
}
