use serde::Serialize;

use crate::domain::entities::event::Event;

use super::rfc3339;

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub event_id: String,
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    pub payload: serde_json::Value,
    pub occurred_at: String,
}

impl EventResponse {
    pub fn from_entity(event: &Event) -> Self {
        Self {
            event_id: event.id.0.to_string(),
            topic: event.topic.as_str().to_string(),
            work_request_id: event.work_request_id.map(|id| id.0.to_string()),
            milestone_id: event.milestone_id.map(|id| id.0.to_string()),
            payment_id: event.payment_id.map(|id| id.0.to_string()),
            payload: event.payload.clone(),
            occurred_at: rfc3339(event.occurred_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventListResponse {
    pub events: Vec<EventResponse>,
}
