//! Sequenced records and their log-line encoding.
//!
//! Input records serialize as `seq|I|topic|action|payload`,
//! output records as `seq|O|message`.

use crate::command::{Command, DELIMITER};
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction marker of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// A command that entered the engine
    Input,
    /// A message produced while handling a command
    Output,
}

impl Direction {
    /// Single-letter marker used in the log line
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Input => "I",
            Self::Output => "O",
        }
    }

    /// Parse a marker
    #[must_use]
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "I" => Some(Self::Input),
            "O" => Some(Self::Output),
            _ => None,
        }
    }
}

/// Body of a sequenced record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordBody {
    /// Verbatim command
    Input(Command),
    /// Raw output message
    Output(String),
}

/// A numbered log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencedRecord {
    /// Sequence number, starting at 1
    pub seq: u64,
    /// Record body
    pub body: RecordBody,
}

impl SequencedRecord {
    /// Create an input record
    #[must_use]
    pub fn input(seq: u64, command: Command) -> Self {
        Self {
            seq,
            body: RecordBody::Input(command),
        }
    }

    /// Create an output record
    #[must_use]
    pub fn output(seq: u64, message: impl Into<String>) -> Self {
        Self {
            seq,
            body: RecordBody::Output(message.into()),
        }
    }

    /// Direction of this record
    #[must_use]
    pub const fn direction(&self) -> Direction {
        match self.body {
            RecordBody::Input(_) => Direction::Input,
            RecordBody::Output(_) => Direction::Output,
        }
    }

    /// The command, for input records
    #[must_use]
    pub fn command(&self) -> Option<&Command> {
        match &self.body {
            RecordBody::Input(cmd) => Some(cmd),
            RecordBody::Output(_) => None,
        }
    }

    /// Parse a single log line (without trailing newline).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedRecord`] if the sequence number, the
    /// direction marker or the input command cannot be read.
    pub fn parse_line(line: &str) -> CoreResult<Self> {
        let malformed = |reason: &str| CoreError::MalformedRecord {
            line: line.to_string(),
            reason: reason.to_string(),
        };

        let mut fields = line.splitn(3, DELIMITER);
        let (Some(seq), Some(marker), Some(rest)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(malformed("expected seq, direction and body"));
        };

        let seq: u64 = seq
            .parse()
            .map_err(|_| malformed("sequence number is not an integer"))?;
        if seq == 0 {
            return Err(malformed("sequence numbers start at 1"));
        }

        match Direction::from_marker(marker) {
            Some(Direction::Input) => {
                let command = Command::parse(rest)
                    .map_err(|_| malformed("input body is not a command"))?;
                Ok(Self::input(seq, command))
            }
            Some(Direction::Output) => Ok(Self::output(seq, rest)),
            None => Err(malformed("unknown direction marker")),
        }
    }
}

impl fmt::Display for SequencedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = self.direction().marker();
        match &self.body {
            RecordBody::Input(cmd) => write!(f, "{}{DELIMITER}{marker}{DELIMITER}{cmd}", self.seq),
            RecordBody::Output(msg) => write!(f, "{}{DELIMITER}{marker}{DELIMITER}{msg}", self.seq),
        }
    }
}

/// Split a log line into its sequence field and the remainder.
///
/// Returns `None` when the line carries no delimiter at all.
#[must_use]
pub fn split_sequence_field(line: &str) -> Option<(&str, &str)> {
    line.split_once(DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_line_format() {
        let cmd = Command::parse("ttt|move|0 0 0 0").unwrap();
        let record = SequencedRecord::input(2, cmd);
        assert_eq!(record.to_string(), "2|I|ttt|move|0 0 0 0");
        assert_eq!(record.direction(), Direction::Input);
    }

    #[test]
    fn test_output_line_format() {
        let record = SequencedRecord::output(1, "Bad Input: ttt new");
        assert_eq!(record.to_string(), "1|O|Bad Input: ttt new");
        assert!(record.command().is_none());
    }

    #[test]
    fn test_parse_input_line() {
        let record = SequencedRecord::parse_line("7|I|ttt|new|").unwrap();
        assert_eq!(record.seq, 7);
        assert_eq!(record.command().unwrap().action(), "new");
    }

    #[test]
    fn test_parse_output_keeps_delimiters() {
        let record = SequencedRecord::parse_line("3|O|a|b").unwrap();
        assert_eq!(record.body, RecordBody::Output("a|b".to_string()));
    }

    #[test]
    fn test_parse_rejects_bad_lines() {
        assert!(SequencedRecord::parse_line("").is_err());
        assert!(SequencedRecord::parse_line("x|O|msg").is_err());
        assert!(SequencedRecord::parse_line("0|O|msg").is_err());
        assert!(SequencedRecord::parse_line("1|X|msg").is_err());
        assert!(SequencedRecord::parse_line("1|I|ttt new").is_err());
    }

    #[test]
    fn test_split_sequence_field() {
        assert_eq!(split_sequence_field("12|O|hi"), Some(("12", "O|hi")));
        assert_eq!(split_sequence_field("no delimiter"), None);
    }
}
