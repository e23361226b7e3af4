pub mod handler;

use std::time::{SystemTime, UNIX_EPOCH};

use flume::Sender;
use tracing::warn;

use crate::event::events::Event;
use crate::http::error::ApiError;

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

/// Frame index for time-based animations at `step_ms` per frame.
pub fn animation_frame(step_ms: u128, frames: usize) -> usize {
    (now_millis() / step_ms.max(1)) as usize % frames.max(1)
}

pub fn get_active_track_icon(is_playing: bool) -> &'static str {
    if !is_playing {
        return "•";
    }
    match animation_frame(100, 6) {
        1 | 4 => "•",
        2 | 3 => "●",
        _ => "·",
    }
}

/// Maps a failed request onto the event the UI reacts to. A 401 always
/// ends the session, anything else becomes a transient error line.
pub fn error_event(context: &str, err: ApiError) -> Event {
    if err.is_unauthorized() {
        Event::Unauthorized
    } else {
        warn!(error = %err, "{context} failed");
        Event::FetchError(format!("{context}: {err}"))
    }
}

/// Awaits `request` and forwards its outcome to the event loop.
pub fn fetch<T, F, M>(
    tx: Sender<Event>,
    context: &'static str,
    request: F,
    into_event: M,
) -> impl Future<Output = ()> + Send + 'static
where
    T: Send + 'static,
    F: Future<Output = crate::http::error::Result<T>> + Send + 'static,
    M: FnOnce(T) -> Event + Send + 'static,
{
    async move {
        let event = match request.await {
            Ok(value) => into_event(value),
            Err(err) => error_event(context, err),
        };
        let _ = tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_maps_unauthorized_to_session_end() {
        let (tx, rx) = flume::unbounded();
        fetch(tx, "Loading", async { Err::<(), _>(ApiError::Unauthorized) }, |_| {
            Event::LoggedOut
        })
        .await;
        assert!(matches!(rx.try_recv(), Ok(Event::Unauthorized)));
    }

    #[tokio::test]
    async fn fetch_forwards_success() {
        let (tx, rx) = flume::unbounded();
        fetch(tx, "Loading", async { Ok(vec![]) }, Event::TrendingFetched).await;
        assert!(matches!(rx.try_recv(), Ok(Event::TrendingFetched(v)) if v.is_empty()));
    }

    #[tokio::test]
    async fn fetch_reports_other_errors_with_context() {
        let (tx, rx) = flume::unbounded();
        let err = ApiError::Server {
            status: 500,
            message: "boom".into(),
        };
        fetch(tx, "Loading trending", async move { Err::<(), _>(err) }, |_| {
            Event::LoggedOut
        })
        .await;
        match rx.try_recv() {
            Ok(Event::FetchError(msg)) => assert!(msg.starts_with("Loading trending")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
