use crate::auth::Claims;
use crate::state::AppState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/events/stream", get(refresh_stream))
}

/// GET /v1/events/stream
///
/// Server-sent refresh notices. After every successful mutation the client
/// receives one `refresh` event naming the availability date and the
/// employee whose booking list changed; it re-fetches those views and
/// nothing else.
async fn refresh_stream(
    State(state): State<AppState>,
    _claims: Claims,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.refresh_tx.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => Event::default()
            .event("refresh")
            .json_data(&event)
            .ok()
            .map(Ok::<_, Infallible>),
        // A lagged receiver just misses old notices; clients re-fetch on the
        // next event anyway.
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
