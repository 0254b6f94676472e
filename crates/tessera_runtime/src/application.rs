//! Application contract.
//!
//! Applications never touch the log directly. While handling a command they
//! push effects into an [`Outbox`]; the engine sequences and writes those
//! effects after the handler returns and before the next command is taken.

use tessera_core::Command;

/// Side effect requested by an application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append an output record with this message
    Output(String),
}

/// Collects the effects of one command
#[derive(Debug, Default)]
pub struct Outbox {
    effects: Vec<Effect>,
}

impl Outbox {
    /// Create an empty outbox
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an output message
    pub fn emit(&mut self, message: impl Into<String>) {
        self.effects.push(Effect::Output(message.into()));
    }

    /// Effects queued so far, in emission order
    #[must_use]
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Number of queued effects
    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Whether nothing was emitted
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Consume the outbox
    #[must_use]
    pub fn into_effects(self) -> Vec<Effect> {
        self.effects
    }
}

/// A handler bound to one or more topics.
///
/// `on_event` runs on the engine's processing context and blocks all
/// further dispatch until it returns. For replay to be meaningful the
/// emitted effects must be a function of the command sequence alone.
pub trait Application: Send + 'static {
    /// Topics this application handles
    fn topics(&self) -> Vec<String>;

    /// Handle one command
    fn on_event(&mut self, command: &Command, outbox: &mut Outbox);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbox_preserves_order() {
        let mut outbox = Outbox::new();
        assert!(outbox.is_empty());
        outbox.emit("first");
        outbox.emit(String::from("second"));
        assert_eq!(outbox.len(), 2);
        assert_eq!(
            outbox.into_effects(),
            vec![
                Effect::Output("first".to_string()),
                Effect::Output("second".to_string())
            ]
        );
    }
}
