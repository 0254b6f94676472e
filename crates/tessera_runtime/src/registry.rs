//! Topic to application dispatch table.

use crate::application::Application;
use indexmap::IndexMap;
use tracing::debug;

/// Maps each topic to one registered application.
///
/// Applications live in slots; each topic points at a slot. Registering
/// an application that claims an already routed topic overwrites that
/// route, so the last registration wins.
#[derive(Debug)]
pub struct Registry<A> {
    handlers: Vec<A>,
    routes: IndexMap<String, usize>,
}

impl<A: Application> Registry<A> {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            routes: IndexMap::new(),
        }
    }

    /// Register an application under all of its topics; returns its slot
    pub fn register(&mut self, app: A) -> usize {
        let slot = self.handlers.len();
        for topic in app.topics() {
            if let Some(previous) = self.routes.insert(topic.clone(), slot) {
                debug!(topic = %topic, previous, slot, "Topic route overwritten");
            }
        }
        self.handlers.push(app);
        slot
    }

    /// Application routed for `topic`
    #[must_use]
    pub fn route(&self, topic: &str) -> Option<&A> {
        self.routes
            .get(topic)
            .and_then(|slot| self.handlers.get(*slot))
    }

    /// Mutable access to the application routed for `topic`
    pub fn route_mut(&mut self, topic: &str) -> Option<&mut A> {
        let slot = *self.routes.get(topic)?;
        self.handlers.get_mut(slot)
    }

    /// Routed topics in registration order
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    /// Number of registered applications
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<A: Application> Default for Registry<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::Outbox;
    use tessera_core::Command;

    struct Named {
        name: &'static str,
        topics: Vec<&'static str>,
    }

    impl Application for Named {
        fn topics(&self) -> Vec<String> {
            self.topics.iter().map(|t| t.to_string()).collect()
        }

        fn on_event(&mut self, _command: &Command, outbox: &mut Outbox) {
            outbox.emit(self.name);
        }
    }

    #[test]
    fn test_register_many_topics() {
        let mut registry = Registry::new();
        registry.register(Named {
            name: "board",
            topics: vec!["ttt", "chess"],
        });

        assert_eq!(registry.route("ttt").unwrap().name, "board");
        assert_eq!(registry.route("chess").unwrap().name, "board");
        assert!(registry.route("go").is_none());
        assert_eq!(registry.topics().collect::<Vec<_>>(), vec!["ttt", "chess"]);
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = Registry::new();
        registry.register(Named {
            name: "first",
            topics: vec!["ttt", "chat"],
        });
        registry.register(Named {
            name: "second",
            topics: vec!["ttt"],
        });

        assert_eq!(registry.route("ttt").unwrap().name, "second");
        assert_eq!(registry.route("chat").unwrap().name, "first");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_route_mut_dispatches() {
        let mut registry = Registry::new();
        registry.register(Named {
            name: "echo",
            topics: vec!["e"],
        });

        let mut outbox = Outbox::new();
        let cmd = Command::parse("e|say|hi").unwrap();
        registry.route_mut("e").unwrap().on_event(&cmd, &mut outbox);
        assert_eq!(outbox.len(), 1);
    }
}
