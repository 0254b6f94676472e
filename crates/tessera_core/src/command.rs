//! Command record codec.
//!
//! A command line has the shape `topic|action|payload`. Only the first two
//! delimiters split; the payload is kept verbatim and may contain further
//! delimiters.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Field delimiter for command lines and log records
pub const DELIMITER: char = '|';

/// A parsed unit of work, immutable once constructed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Command {
    topic: String,
    action: String,
    payload: String,
}

impl Command {
    /// Parse a raw line into a command.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedCommand`] unless the line splits into
    /// exactly three fields.
    pub fn parse(line: &str) -> CoreResult<Self> {
        let mut fields = line.splitn(3, DELIMITER);
        match (fields.next(), fields.next(), fields.next()) {
            (Some(topic), Some(action), Some(payload)) => Ok(Self {
                topic: topic.to_string(),
                action: action.to_string(),
                payload: payload.to_string(),
            }),
            _ => Err(CoreError::MalformedCommand {
                line: line.to_string(),
            }),
        }
    }

    /// Build a command from its fields.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DelimiterInField`] if topic or action contain the
    /// delimiter, since the command could not be parsed back from its line.
    pub fn try_new(
        topic: impl Into<String>,
        action: impl Into<String>,
        payload: impl Into<String>,
    ) -> CoreResult<Self> {
        let topic = topic.into();
        let action = action.into();
        if topic.contains(DELIMITER) {
            return Err(CoreError::DelimiterInField {
                field: "topic",
                value: topic,
            });
        }
        if action.contains(DELIMITER) {
            return Err(CoreError::DelimiterInField {
                field: "action",
                value: action,
            });
        }
        Ok(Self {
            topic,
            action,
            payload: payload.into(),
        })
    }

    /// Topic used for routing
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Action within the topic
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Free-form payload
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{DELIMITER}{}{DELIMITER}{}",
            self.topic, self.action, self.payload
        )
    }
}

impl FromStr for Command {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
