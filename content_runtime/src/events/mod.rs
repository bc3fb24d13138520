//! Events - typed notifications exchanged between content instances and the host.
//!
//! An [`Event`] has a fixed shape: a kind, a payload mapping, a
//! default-prevented flag and the id of the instance that dispatched it.
//! Extra fields are stored as payload entries rather than attached ad hoc.

mod dispatcher;

pub use dispatcher::*;

use serde_json::{Map, Value};

use crate::content::ContentId;

/// The kind of an event. Handlers subscribe by kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The instance was attached to a DOM region.
    Attach,

    /// The instance finished construction and wiring.
    Init,

    /// The hosting window was resized.
    Resize,

    /// A question was answered correctly.
    Completed,

    /// A question was answered incorrectly.
    Failed,

    /// The user interacted with the content.
    Interacted,

    /// Assets requested on behalf of an instance finished loading.
    AssetsLoaded,

    /// Custom kind for extension.
    Custom(String),
}

impl EventKind {
    /// Create a custom event kind.
    pub fn custom(name: impl Into<String>) -> Self {
        EventKind::Custom(name.into())
    }

    /// The wire name of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Attach => "attach",
            EventKind::Init => "init",
            EventKind::Resize => "resize",
            EventKind::Completed => "completed",
            EventKind::Failed => "failed",
            EventKind::Interacted => "interacted",
            EventKind::AssetsLoaded => "assets-loaded",
            EventKind::Custom(name) => name,
        }
    }
}

impl From<&str> for EventKind {
    fn from(name: &str) -> Self {
        match name {
            "attach" => EventKind::Attach,
            "init" => EventKind::Init,
            "resize" => EventKind::Resize,
            "completed" => EventKind::Completed,
            "failed" => EventKind::Failed,
            "interacted" => EventKind::Interacted,
            "assets-loaded" => EventKind::AssetsLoaded,
            other => EventKind::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification passed to every matching handler.
///
/// The same instance is handed to all handlers of one dispatch, so a
/// handler calling [`Event::prevent_default`] is visible to the handlers
/// that run after it.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub payload: Map<String, Value>,
    pub default_prevented: bool,
    /// Id of the instance whose dispatcher delivered the event.
    pub target: Option<ContentId>,
}

impl Event {
    /// Create an event with an empty payload.
    pub fn new(kind: impl Into<EventKind>) -> Self {
        Self {
            kind: kind.into(),
            payload: Map::new(),
            default_prevented: false,
            target: None,
        }
    }

    /// Create an event from a JSON value.
    ///
    /// Objects become the payload directly; any other value is stored under `data`.
    pub fn with_data(kind: impl Into<EventKind>, data: Value) -> Self {
        let payload = match data {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        Self {
            payload,
            ..Self::new(kind)
        }
    }

    /// Add an extra payload field.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Look up a payload field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Ask later handlers and the dispatching code to skip default handling.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether any handler called [`Event::prevent_default`].
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

impl From<EventKind> for Event {
    fn from(kind: EventKind) -> Self {
        Event::new(kind)
    }
}

impl From<&str> for Event {
    fn from(kind: &str) -> Self {
        Event::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_round_trip_names() {
        assert_eq!(EventKind::from("completed"), EventKind::Completed);
        assert_eq!(EventKind::from("resize").as_str(), "resize");
        assert_eq!(
            EventKind::from("progressed"),
            EventKind::custom("progressed")
        );
        assert_eq!(EventKind::custom("progressed").to_string(), "progressed");
    }

    #[test]
    fn test_event_with_object_data() {
        let event = Event::with_data("attach", json!({ "container": 4 }));
        assert_eq!(event.kind, EventKind::Attach);
        assert_eq!(event.get("container"), Some(&json!(4)));
        assert!(!event.is_default_prevented());
        assert!(event.target.is_none());
    }

    #[test]
    fn test_event_with_scalar_data() {
        let event = Event::with_data("custom-kind", json!("hello"));
        assert_eq!(event.get("data"), Some(&json!("hello")));
    }

    #[test]
    fn test_extras_become_payload_fields() {
        let event = Event::new(EventKind::Completed)
            .with_extra("score", 1)
            .with_extra("maxScore", 1);
        assert_eq!(event.payload.len(), 2);
        assert_eq!(event.get("score"), Some(&json!(1)));
    }

    #[test]
    fn test_prevent_default() {
        let mut event = Event::new("init");
        event.prevent_default();
        assert!(event.is_default_prevented());
    }
}
