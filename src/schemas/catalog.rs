//! Tag, label, state and event payloads and response bodies.

use super::rules::{self, FieldReader, IntRule};
use super::FromPayload;
use crate::error::ValidationError;
use crate::models::{Event, Label, State, Tag};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Labels issued per request.
pub const LABEL_COUNT: IntRule = IntRule { min: 1, max: 100 };

/// Body of POST /tags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagCreate {
    pub tag_name: String,
}

impl FromPayload for TagCreate {
    fn from_payload(value: Value) -> Result<Self, ValidationError> {
        let mut r = FieldReader::object(value, &["tag_name"])?;
        let tag_name = r.required_text("tag_name", &rules::TAG_NAME);
        r.finish()?;
        Ok(TagCreate {
            tag_name: tag_name.unwrap_or_default(),
        })
    }
}

/// Body of POST /labels. An empty body issues one label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelCreate {
    pub count: u32,
}

impl FromPayload for LabelCreate {
    fn from_payload(value: Value) -> Result<Self, ValidationError> {
        let mut r = FieldReader::object(value, &["count"])?;
        let count = r.integer("count", &LABEL_COUNT).unwrap_or(1);
        r.finish()?;
        Ok(LabelCreate {
            count: u32::try_from(count).unwrap_or(1),
        })
    }
}

/// Query string of GET /labels.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelQuery {
    pub unassigned_only: bool,
}

impl LabelQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ValidationError> {
        let unassigned_only = match params.get("unassigned").map(|v| v.trim()) {
            None | Some("") | Some("false") | Some("0") => false,
            Some("true") | Some("1") => true,
            Some(_) => return Err(ValidationError::single("unassigned", "must be true or false")),
        };
        Ok(LabelQuery { unassigned_only })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagResponse {
    pub tag_id: i64,
    pub tag_name: String,
}

impl From<Tag> for TagResponse {
    fn from(t: Tag) -> Self {
        TagResponse {
            tag_id: t.tag_id,
            tag_name: t.tag_name,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelResponse {
    pub label_id: i64,
    pub creation_date: DateTime<Utc>,
    pub item_id: Option<i64>,
}

impl From<Label> for LabelResponse {
    fn from(l: Label) -> Self {
        LabelResponse {
            label_id: l.label_id,
            creation_date: l.creation_date,
            item_id: l.item_id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateResponse {
    pub state_id: i64,
    pub state_name: String,
}

impl From<State> for StateResponse {
    fn from(s: State) -> Self {
        StateResponse {
            state_id: s.state_id,
            state_name: s.state_name,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventResponse {
    pub event_id: i64,
    pub event_date: DateTime<Utc>,
    pub item_id: i64,
    pub to_state: Option<i64>,
    pub parent_item_id: Option<i64>,
}

impl From<Event> for EventResponse {
    fn from(e: Event) -> Self {
        EventResponse {
            event_id: e.event_id,
            event_date: e.event_date,
            item_id: e.item_id,
            to_state: e.to_state,
            parent_item_id: e.parent_item_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tag_name_is_trimmed_and_checked() {
        assert_eq!(
            TagCreate::from_payload(json!({"tag_name": " garden "})).unwrap().tag_name,
            "garden"
        );
        let err = TagCreate::from_payload(json!({"tag_name": "a/b"})).unwrap_err();
        assert!(err.has_field("tag_name"));
        let err = TagCreate::from_payload(json!({})).unwrap_err();
        assert_eq!(err.errors[0].message, "is required");
    }

    #[test]
    fn label_count_defaults_to_one_and_is_bounded() {
        assert_eq!(LabelCreate::from_payload(json!({})).unwrap().count, 1);
        assert_eq!(LabelCreate::from_payload(json!({"count": 12})).unwrap().count, 12);
        assert!(LabelCreate::from_payload(json!({"count": 101})).is_err());
        assert!(LabelCreate::from_payload(json!({"count": 0})).is_err());
    }

    #[test]
    fn label_query_reads_unassigned_flag() {
        let mut params = HashMap::new();
        assert!(!LabelQuery::from_params(&params).unwrap().unassigned_only);
        params.insert("unassigned".to_string(), "true".to_string());
        assert!(LabelQuery::from_params(&params).unwrap().unassigned_only);
        params.insert("unassigned".to_string(), "yes".to_string());
        assert!(LabelQuery::from_params(&params).is_err());
    }
}
