//! Server-Sent-Events feed of mutation events.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream};

use signpost::broadcast::MutationEvent;

use crate::state::AppState;

/// Stream every mutation published from now on.
///
/// Each event is named by its wire name (`location:create`, ...) and carries
/// the JSON payload as data. The stream ends when the client disconnects.
pub async fn feed(State(state): State<AppState>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.registry.broadcaster().subscribe();
    tracing::debug!(
        subscribers = state.registry.broadcaster().subscriber_count(),
        "subscriber connected"
    );

    let events = stream::unfold(subscription, |mut subscription| async move {
        let event = subscription.recv().await?;
        Some((Ok(to_sse(&event)), subscription))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

fn to_sse(event: &MutationEvent) -> Event {
    Event::default()
        .event(event.name())
        .data(event.payload.to_string())
}
