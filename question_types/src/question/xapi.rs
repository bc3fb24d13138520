//! xAPI-style interaction data.

use serde_json::{json, Value};
use uuid::Uuid;

use content_runtime::Event;

pub const VERB_BASE: &str = "http://adlnet.gov/expapi/verbs/";
pub const INTERACTION_ACTIVITY: &str = "http://adlnet.gov/expapi/activities/cmi.interaction";

/// Separator between indices in a response pattern.
pub const RESPONSE_SEPARATOR: &str = "[,]";

/// An interaction event and the statement describing it.
#[derive(Debug, Clone)]
pub struct XapiData {
    pub event: Event,
    pub statement: Value,
}

/// Statement skeleton: a fresh id, the verb of `event` and an activity
/// object with the given definition. No actor; transport adds it.
pub fn statement(event: &Event, definition: Value) -> Value {
    let verb = event.kind.as_str();
    let object_id = event
        .target
        .map(|id| format!("content:{}", id))
        .unwrap_or_else(|| "content".to_string());

    json!({
        "id": Uuid::new_v4().to_string(),
        "verb": {
            "id": format!("{}{}", VERB_BASE, verb),
            "display": { "en-US": verb }
        },
        "object": {
            "id": object_id,
            "objectType": "Activity",
            "definition": definition
        }
    })
}

/// Join indices into a response pattern such as `0[,]2`.
pub fn response_pattern(indices: impl IntoIterator<Item = usize>) -> String {
    indices
        .into_iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(RESPONSE_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use content_runtime::{ContentId, EventKind};

    #[test]
    fn test_statement_shape() {
        let mut event = Event::new(EventKind::Interacted);
        event.target = Some(ContentId(4));

        let statement = statement(&event, json!({ "interactionType": "choice" }));

        assert_eq!(statement["verb"]["id"], json!("http://adlnet.gov/expapi/verbs/interacted"));
        assert_eq!(statement["object"]["id"], json!("content:4"));
        assert_eq!(statement["object"]["definition"]["interactionType"], json!("choice"));
        assert!(Uuid::parse_str(statement["id"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_statement_ids_are_unique() {
        let event = Event::new(EventKind::Interacted);
        assert_ne!(statement(&event, json!({}))["id"], statement(&event, json!({}))["id"]);
    }

    #[test]
    fn test_response_pattern() {
        assert_eq!(response_pattern([0, 2]), "0[,]2");
        assert_eq!(response_pattern(Vec::new()), "");
    }
}
