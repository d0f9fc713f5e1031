//! Mutation events as subscribers see them.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use signpost_core::ResourceClass;

/// What happened to the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Create,
    Update,
    Delete,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Create => "create",
            EventKind::Update => "update",
            EventKind::Delete => "delete",
        }
    }
}

/// Which stream of events the change belongs to.
///
/// `ViewLocation` carries the follow-up updates for locations that reference
/// a view which just changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    #[serde(rename = "location")]
    Location,
    #[serde(rename = "view")]
    View,
    #[serde(rename = "view-location")]
    ViewLocation,
}

impl EventTopic {
    pub fn as_str(self) -> &'static str {
        match self {
            EventTopic::Location => "location",
            EventTopic::View => "view",
            EventTopic::ViewLocation => "view-location",
        }
    }

    /// The topic for direct changes to records of `class`.
    ///
    /// Users have no topic; user changes are not broadcast.
    pub fn for_class(class: ResourceClass) -> Option<Self> {
        match class {
            ResourceClass::Location => Some(EventTopic::Location),
            ResourceClass::View => Some(EventTopic::View),
            ResourceClass::User => None,
        }
    }
}

/// One change notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationEvent {
    pub kind: EventKind,
    pub topic: EventTopic,
    pub payload: Value,
}

impl MutationEvent {
    pub fn new(kind: EventKind, topic: EventTopic, payload: Value) -> Self {
        Self {
            kind,
            topic,
            payload,
        }
    }

    /// A creation event carrying the new record.
    pub fn created<T: Serialize>(topic: EventTopic, record: &T) -> serde_json::Result<Self> {
        Ok(Self::new(EventKind::Create, topic, serde_json::to_value(record)?))
    }

    /// An update event carrying the record as stored after the write.
    pub fn updated<T: Serialize>(topic: EventTopic, record: &T) -> serde_json::Result<Self> {
        Ok(Self::new(EventKind::Update, topic, serde_json::to_value(record)?))
    }

    /// A deletion event. Only the name survives a delete.
    pub fn deleted(topic: EventTopic, name: &str) -> Self {
        Self::new(EventKind::Delete, topic, json!({ "deleted": name }))
    }

    /// The event name on the wire, e.g. `location:create`.
    pub fn name(&self) -> String {
        format!("{}:{}", self.topic.as_str(), self.kind.as_str())
    }
}

impl fmt::Display for MutationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.topic.as_str(), self.kind.as_str())
    }
}
