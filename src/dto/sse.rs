//! Server-sent event payloads.

use serde::Serialize;
use utoipa::ToSchema;

use crate::state::events::Published;

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    /// SSE `event:` name; `None` sends an unnamed message.
    pub event: Option<String>,
    /// SSE `data:` body.
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Body of every fabric event forwarded to SSE clients.
pub struct EventPayload {
    /// Subject the event was published on (`app.lobby.rooms` or `app.room.<name>`).
    pub subject: String,
    /// Event token, identical to the SSE `event:` field.
    pub event: String,
}

impl TryFrom<&Published> for ServerEvent {
    type Error = serde_json::Error;

    fn try_from(published: &Published) -> Result<Self, Self::Error> {
        let token = published.event.as_str();
        ServerEvent::json(
            Some(token.to_owned()),
            &EventPayload {
                subject: published.subject.to_string(),
                event: token.to_owned(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::state::RoomEvent;

    #[test]
    fn published_event_maps_to_named_sse_event() {
        let published = Published {
            subject: Arc::from("app.room.r1"),
            event: RoomEvent::RoomVoting,
        };

        let event = ServerEvent::try_from(&published).unwrap();
        assert_eq!(event.event.as_deref(), Some("RoomVoting"));
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&event.data).unwrap(),
            serde_json::json!({ "subject": "app.room.r1", "event": "RoomVoting" })
        );
    }
}
