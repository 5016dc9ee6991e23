//! Bridges event fabric subscriptions onto SSE responses.

use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use crate::{
    dto::sse::ServerEvent,
    error::ServiceError,
    services::room_service::find_room,
    state::{LOBBY_SUBJECT, SharedState, events::EventSubscription, room_subject},
};

/// Subscribe to lobby-wide room list changes.
pub fn subscribe_lobby(state: &SharedState) -> EventSubscription {
    state.events().subscribe(LOBBY_SUBJECT)
}

/// Subscribe to a live room's events.
pub fn subscribe_room(state: &SharedState, name: &str) -> Result<EventSubscription, ServiceError> {
    let room = find_room(state, name)?;
    let subscription = state.events().subscribe(&room_subject(room.name()));
    // The room may have been deleted between lookup and subscribe.
    if state.rooms().get(name).is_none() {
        state.events().close(&room_subject(name));
        return Err(ServiceError::RoomNotFound(name.to_owned()));
    }
    Ok(subscription)
}

/// Convert a fabric subscription into an SSE response, forwarding events until the
/// client disconnects or the subject is closed.
pub fn to_sse_stream(
    mut subscription: EventSubscription,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Forwarder blocks once the client is eight events behind.
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                next = subscription.next() => {
                    let Some(published) = next else {
                        break;
                    };
                    let payload = match ServerEvent::try_from(&published) {
                        Ok(payload) => payload,
                        Err(err) => {
                            warn!(error = %err, "failed to encode event payload");
                            continue;
                        }
                    };

                    let mut event = Event::default().data(payload.data);
                    if let Some(name) = payload.event {
                        event = event.event(name);
                    }

                    if tx.send(Ok(event)).await.is_err() {
                        break;
                    }
                }
            }
        }

        info!(subject = %subscription.subject(), "SSE stream disconnected");
    });

    // Dropped by axum on disconnect, which closes `tx` and stops the forwarder.
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
