//! Durable log writer.
//!
//! Every append formats one record, writes it and flushes before
//! returning, so a record is on the store by the time the caller moves on.

use crate::error::{LogError, LogResult};
use crate::rotation::rotate_existing;
use crate::sequencer::Sequencer;
use crate::store::LogStore;
use std::io::Write;
use std::path::{Path, PathBuf};
use tessera_core::{Command, SequencedRecord};
use tracing::{debug, info};

/// Sequencer plus append handle for a single log file
#[derive(Debug)]
pub struct LogWriter<W> {
    sink: W,
    sequencer: Sequencer,
    path: PathBuf,
}

impl<W: Write> LogWriter<W> {
    /// Open a fresh log at `path`, rotating any existing file first.
    ///
    /// # Errors
    ///
    /// Returns error if rotation or creation fails
    pub fn open<S>(store: &S, path: impl AsRef<Path>) -> LogResult<Self>
    where
        S: LogStore<Handle = W>,
    {
        let path = path.as_ref();
        let rotated = rotate_existing(store, path)?;
        let sink = store.create(path)?;
        info!(
            path = %path.display(),
            rotated = ?rotated,
            "Opened record log"
        );
        Ok(Self::from_sink(sink, path))
    }

    /// Wrap an already opened sink
    #[must_use]
    pub fn from_sink(sink: W, path: impl Into<PathBuf>) -> Self {
        Self {
            sink,
            sequencer: Sequencer::new(),
            path: path.into(),
        }
    }

    /// Append an input record; returns its sequence number
    ///
    /// # Errors
    ///
    /// Returns error if the append fails
    pub fn write_input(&mut self, command: &Command) -> LogResult<u64> {
        let seq = self.sequencer.next_seq()?;
        self.append(&SequencedRecord::input(seq, command.clone()))?;
        Ok(seq)
    }

    /// Append an output record; returns its sequence number
    ///
    /// # Errors
    ///
    /// Returns error if the append fails
    pub fn write_output(&mut self, message: &str) -> LogResult<u64> {
        let seq = self.sequencer.next_seq()?;
        self.append(&SequencedRecord::output(seq, message))?;
        Ok(seq)
    }

    fn append(&mut self, record: &SequencedRecord) -> LogResult<()> {
        let line = format!("{record}\n");
        self.sink
            .write_all(line.as_bytes())
            .and_then(|()| self.sink.flush())
            .map_err(|e| LogError::io("append to", &self.path, e))?;
        debug!(seq = record.seq, direction = ?record.direction(), "Appended record");
        Ok(())
    }

    /// Last sequence number written (0 for an empty log)
    #[must_use]
    pub const fn last_seq(&self) -> u64 {
        self.sequencer.last()
    }

    /// Path of the log this writer appends to
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FsLogStore, MemoryLogStore};

    #[test]
    fn test_writes_numbered_records() {
        let store = MemoryLogStore::new();
        let mut writer = LogWriter::open(&store, "run.log").unwrap();

        let cmd = Command::parse("ttt|new|").unwrap();
        assert_eq!(writer.write_input(&cmd).unwrap(), 1);
        assert_eq!(writer.write_output("new game command processed").unwrap(), 2);
        assert_eq!(writer.last_seq(), 2);

        assert_eq!(
            store.contents("run.log").unwrap(),
            "1|I|ttt|new|\n2|O|new game command processed\n"
        );
    }

    #[test]
    fn test_open_rotates_and_resets_counter() {
        let store = MemoryLogStore::new();
        {
            let mut first = LogWriter::open(&store, "run.log").unwrap();
            first.write_output("first run").unwrap();
            first.write_output("still first").unwrap();
        }

        let mut second = LogWriter::open(&store, "run.log").unwrap();
        assert_eq!(second.last_seq(), 0);
        assert_eq!(store.contents("run.log").unwrap(), "");
        assert_eq!(
            store.contents("run-1.log").unwrap(),
            "1|O|first run\n2|O|still first\n"
        );

        assert_eq!(second.write_output("second run").unwrap(), 1);
        assert_eq!(store.contents("run.log").unwrap(), "1|O|second run\n");
    }

    #[test]
    fn test_fs_writer_preserves_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.log");
        let store = FsLogStore::new();

        let mut first = LogWriter::open(&store, &path).unwrap();
        first.write_output("one").unwrap();
        drop(first);

        let mut second = LogWriter::open(&store, &path).unwrap();
        second.write_output("two").unwrap();
        drop(second);

        let history = std::fs::read_to_string(dir.path().join("session-1.log")).unwrap();
        assert_eq!(history, "1|O|one\n");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1|O|two\n");
    }
}
