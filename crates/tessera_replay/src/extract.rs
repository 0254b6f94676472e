//! Input extraction from saved logs and command scripts.

use crate::error::ReplayResult;
use std::path::Path;
use tessera_core::SequencedRecord;
use tessera_log::LogStore;
use tracing::debug;

/// Raw command lines of every input record, in log order.
///
/// Output records and lines that are not records are skipped.
#[must_use]
pub fn extract_inputs(log: &str) -> Vec<String> {
    log.lines()
        .enumerate()
        .filter_map(|(index, line)| match SequencedRecord::parse_line(line) {
            Ok(record) => record.command().map(ToString::to_string),
            Err(err) => {
                if !line.is_empty() {
                    debug!(line = index + 1, error = %err, "Skipping non-record line");
                }
                None
            }
        })
        .collect()
}

/// [`extract_inputs`] for a log held in `store`
///
/// # Errors
///
/// Returns error if the log cannot be read
pub fn extract_inputs_from<S: LogStore>(store: &S, path: &Path) -> ReplayResult<Vec<String>> {
    let log = store.read_to_string(path)?;
    Ok(extract_inputs(&log))
}

/// Command lines of a script: trimmed, without blanks and `#` comments
#[must_use]
pub fn read_script(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_log::MemoryLogStore;

    const LOG: &str = "1|I|ttt|new|\n\
                       2|O|new game command processed\n\
                       3|O|Bad Input: ttt new\n\
                       4|I|ttt|move|0 0 0 0\n\
                       5|O|Placed piece at (0,0) (bank: 0)\n\
                       6|I|chat|say|a|b\n";

    #[test]
    fn test_extracts_only_inputs() {
        assert_eq!(
            extract_inputs(LOG),
            vec!["ttt|new|", "ttt|move|0 0 0 0", "chat|say|a|b"]
        );
    }

    #[test]
    fn test_extract_skips_garbage() {
        let log = "1|I|a|b|c\nnot a record\n\n2|I|d|e|f\n";
        assert_eq!(extract_inputs(log), vec!["a|b|c", "d|e|f"]);
    }

    #[test]
    fn test_extract_from_store() {
        let store = MemoryLogStore::new();
        store.insert("base.log", LOG).unwrap();
        let inputs = extract_inputs_from(&store, Path::new("base.log")).unwrap();
        assert_eq!(inputs.len(), 3);
        assert!(extract_inputs_from(&store, Path::new("missing.log")).is_err());
    }

    #[test]
    fn test_read_script() {
        let script = "# Seed: 1\n# Tie game\nttt|new|\n\n  ttt|move|0 0 0 0  \n# done\nttt|show|\n";
        assert_eq!(
            read_script(script),
            vec!["ttt|new|", "ttt|move|0 0 0 0", "ttt|show|"]
        );
    }
}
