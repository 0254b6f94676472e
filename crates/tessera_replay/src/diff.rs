//! Regression comparator.
//!
//! Two logs are equivalent when they have the same number of lines and,
//! line by line, agree on everything after the sequence field. Only the
//! leading sequence number is ignored. The direction marker is part of the
//! compared remainder, but an output line can still coincide with an input
//! line whose remainder reads the same; the comparison does not try to
//! tell such lines apart.

use crate::error::ReplayResult;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tessera_core::split_sequence_field;
use tessera_log::LogStore;

/// First line at which two logs disagree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Divergence {
    /// Zero-based line index
    pub line: usize,
    /// Line in the original log
    pub original: String,
    /// Line in the replayed log
    pub replay: String,
}

/// Why two logs are not equivalent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mismatch {
    /// Logs have different line counts
    LineCount {
        /// Lines in the original log
        original: usize,
        /// Lines in the replayed log
        replay: usize,
    },
    /// A line pair differs
    Line(Divergence),
}

/// Result of comparing two logs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    /// Whether the logs are equivalent
    pub equivalent: bool,
    /// First reason they are not
    pub mismatch: Option<Mismatch>,
}

impl DiffResult {
    fn equivalent() -> Self {
        Self {
            equivalent: true,
            mismatch: None,
        }
    }

    fn mismatch(mismatch: Mismatch) -> Self {
        Self {
            equivalent: false,
            mismatch: Some(mismatch),
        }
    }
}

/// Lines are equal after dropping the sequence field. A line without any
/// delimiter is compared whole.
fn lines_match(original: &str, replay: &str) -> bool {
    match (split_sequence_field(original), split_sequence_field(replay)) {
        (Some((_, left)), Some((_, right))) => left == right,
        _ => original == replay,
    }
}

/// Compare two log texts and report the first difference
#[must_use]
pub fn diff_logs(original: &str, replay: &str) -> DiffResult {
    let original_lines: Vec<&str> = original.split('\n').collect();
    let replay_lines: Vec<&str> = replay.split('\n').collect();

    if original_lines.len() != replay_lines.len() {
        return DiffResult::mismatch(Mismatch::LineCount {
            original: original_lines.len(),
            replay: replay_lines.len(),
        });
    }

    original_lines
        .iter()
        .zip(&replay_lines)
        .enumerate()
        .find(|(_, (left, right))| !lines_match(left, right))
        .map_or_else(DiffResult::equivalent, |(line, (left, right))| {
            DiffResult::mismatch(Mismatch::Line(Divergence {
                line,
                original: (*left).to_string(),
                replay: (*right).to_string(),
            }))
        })
}

/// Whether two log texts are equivalent
#[must_use]
pub fn compare(original: &str, replay: &str) -> bool {
    diff_logs(original, replay).equivalent
}

/// [`diff_logs`] for two logs held in `store`
///
/// # Errors
///
/// Returns error if either log cannot be read
pub fn compare_files<S: LogStore>(
    store: &S,
    original: &Path,
    replay: &Path,
) -> ReplayResult<DiffResult> {
    let original = store.read_to_string(original)?;
    let replay = store.read_to_string(replay)?;
    Ok(diff_logs(&original, &replay))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_log::MemoryLogStore;

    #[test]
    fn test_identical_logs_match() {
        let log = "1|I|ttt|new|\n2|O|new game command processed\n";
        assert!(compare(log, log));
        assert_eq!(diff_logs(log, log), DiffResult::equivalent());
    }

    #[test]
    fn test_sequence_numbers_ignored() {
        let original = "1|I|ttt|new|\n2|O|ok\n";
        let replay = "41|I|ttt|new|\n42|O|ok\n";
        assert!(compare(original, replay));
    }

    #[test]
    fn test_line_count_mismatch() {
        let result = diff_logs("1|O|a\n", "1|O|a\n2|O|b\n");
        assert!(!result.equivalent);
        assert_eq!(
            result.mismatch,
            Some(Mismatch::LineCount {
                original: 2,
                replay: 3
            })
        );
    }

    #[test]
    fn test_trailing_newline_counts() {
        assert!(!compare("1|O|a\n", "1|O|a"));
    }

    #[test]
    fn test_first_divergence_reported() {
        let original = "1|I|ttt|new|\n2|O|X wins\n3|O|same\n";
        let replay = "1|I|ttt|new|\n2|O|O wins\n3|O|other\n";
        let result = diff_logs(original, replay);
        assert_eq!(
            result.mismatch,
            Some(Mismatch::Line(Divergence {
                line: 1,
                original: "2|O|X wins".to_string(),
                replay: "2|O|O wins".to_string(),
            }))
        );
    }

    #[test]
    fn test_direction_marker_is_compared() {
        assert!(!compare("1|I|x|y|z\n", "1|O|x|y|z\n"));
    }

    #[test]
    fn test_lines_without_delimiter_compared_whole() {
        assert!(compare("1|O|a\ncontinued\n", "9|O|a\ncontinued\n"));
        assert!(!compare("1|O|a\ncontinued\n", "1|O|a\nchanged\n"));
        assert!(!compare("plain\n", "1|plain\n"));
    }

    #[test]
    fn test_empty_logs_match() {
        assert!(compare("", ""));
    }

    #[test]
    fn test_compare_files() {
        let store = MemoryLogStore::new();
        store.insert("a.log", "1|O|hi\n").unwrap();
        store.insert("b.log", "7|O|hi\n").unwrap();
        let result = compare_files(&store, Path::new("a.log"), Path::new("b.log")).unwrap();
        assert!(result.equivalent);
        assert!(compare_files(&store, Path::new("a.log"), Path::new("c.log")).is_err());
    }

    #[test]
    fn test_diff_result_serializes() {
        let result = diff_logs("1|O|a\n", "1|O|b\n");
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"equivalent\":false"));
    }
}
