use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use flume::Sender;
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::debug;
use url::Url;

use super::{MediaEventKind, emit};
use crate::{
    audio::{error::MediaError, traits::MediaElement},
    event::events::Event,
};

/// Plays nothing. A clock advances the position once per `tick` while
/// playing and reports `Ended` at the track duration.
pub struct SimulatedElement {
    event_tx: Sender<Event>,
    tick: Duration,
    token: u64,
    source: Option<Url>,
    duration: Option<Duration>,
    position_millis: Arc<AtomicU64>,
    ticker: Option<JoinHandle<()>>,
    volume: f32,
}

impl SimulatedElement {
    pub fn new(event_tx: Sender<Event>, tick: Duration) -> Self {
        Self {
            event_tx,
            tick,
            token: 0,
            source: None,
            duration: None,
            position_millis: Arc::new(AtomicU64::new(0)),
            ticker: None,
            volume: 1.0,
        }
    }

    pub fn position(&self) -> Duration {
        Duration::from_millis(self.position_millis.load(Ordering::Relaxed))
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl MediaElement for SimulatedElement {
    fn load(
        &mut self,
        token: u64,
        url: &Url,
        duration_hint: Option<Duration>,
    ) -> Result<(), MediaError> {
        self.stop_ticker();
        debug!(%url, token, "Simulated load");

        self.token = token;
        self.source = Some(url.clone());
        self.duration = duration_hint.filter(|d| !d.is_zero());
        self.position_millis.store(0, Ordering::Relaxed);

        emit(&self.event_tx, token, MediaEventKind::LoadStart);
        if let Some(duration) = self.duration {
            emit(&self.event_tx, token, MediaEventKind::DurationChange(duration));
        }
        emit(&self.event_tx, token, MediaEventKind::CanPlay);
        Ok(())
    }

    fn play(&mut self) -> Result<(), MediaError> {
        if self.source.is_none() {
            return Err(MediaError::Playback("no source loaded".into()));
        }
        let handle = Handle::try_current()
            .map_err(|e| MediaError::Device(format!("no async runtime: {e}")))?;

        self.stop_ticker();

        let tx = self.event_tx.clone();
        let token = self.token;
        let tick = self.tick;
        let duration = self.duration;
        let position = self.position_millis.clone();

        self.ticker = Some(handle.spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.tick().await;
            loop {
                interval.tick().await;
                let step = tick.as_millis() as u64;
                let mut now = position.fetch_add(step, Ordering::Relaxed) + step;
                if let Some(total) = duration {
                    let total = total.as_millis() as u64;
                    if now >= total {
                        now = total;
                        position.store(total, Ordering::Relaxed);
                        emit(&tx, token, MediaEventKind::TimeUpdate(Duration::from_millis(now)));
                        emit(&tx, token, MediaEventKind::Ended);
                        break;
                    }
                }
                emit(&tx, token, MediaEventKind::TimeUpdate(Duration::from_millis(now)));
            }
        }));
        Ok(())
    }

    fn pause(&mut self) {
        self.stop_ticker();
    }

    fn seek(&mut self, position: Duration) {
        let position = match self.duration {
            Some(total) => position.min(total),
            None => position,
        };
        self.position_millis
            .store(position.as_millis() as u64, Ordering::Relaxed);
        emit(&self.event_tx, self.token, MediaEventKind::TimeUpdate(position));
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }
}

impl Drop for SimulatedElement {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::element::MediaEvent;

    fn media_kinds(rx: &flume::Receiver<Event>) -> Vec<MediaEventKind> {
        rx.try_iter()
            .filter_map(|e| match e {
                Event::Media(MediaEvent { kind, .. }) => Some(kind),
                _ => None,
            })
            .collect()
    }

    fn url() -> Url {
        Url::parse("http://localhost:8000/media/a.mp3").unwrap()
    }

    #[test]
    fn play_without_source_fails() {
        let (tx, _rx) = flume::unbounded();
        let mut element = SimulatedElement::new(tx, Duration::from_millis(10));
        assert!(matches!(element.play(), Err(MediaError::Playback(_))));
    }

    #[tokio::test]
    async fn load_announces_duration_and_readiness() {
        let (tx, rx) = flume::unbounded();
        let mut element = SimulatedElement::new(tx, Duration::from_millis(10));

        element.load(3, &url(), Some(Duration::from_secs(2))).unwrap();

        assert_eq!(
            media_kinds(&rx),
            vec![
                MediaEventKind::LoadStart,
                MediaEventKind::DurationChange(Duration::from_secs(2)),
                MediaEventKind::CanPlay,
            ]
        );
    }

    #[tokio::test]
    async fn clock_runs_to_the_end() {
        let (tx, rx) = flume::unbounded();
        let mut element = SimulatedElement::new(tx, Duration::from_millis(10));
        element.load(1, &url(), Some(Duration::from_millis(30))).unwrap();
        let _ = media_kinds(&rx);

        element.play().unwrap();

        let mut kinds = Vec::new();
        while let Ok(Ok(Event::Media(event))) =
            tokio::time::timeout(Duration::from_secs(2), rx.recv_async()).await
        {
            assert_eq!(event.token, 1);
            let ended = event.kind == MediaEventKind::Ended;
            kinds.push(event.kind);
            if ended {
                break;
            }
        }

        assert_eq!(kinds.last(), Some(&MediaEventKind::Ended));
        assert_eq!(element.position(), Duration::from_millis(30));
    }

    #[tokio::test]
    async fn pause_stops_the_clock() {
        let (tx, rx) = flume::unbounded();
        let mut element = SimulatedElement::new(tx, Duration::from_millis(10));
        element.load(1, &url(), Some(Duration::from_secs(60))).unwrap();

        element.play().unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        element.pause();
        let paused_at = element.position();
        let _ = media_kinds(&rx);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(element.position(), paused_at);
        assert!(media_kinds(&rx).is_empty());
    }

    #[tokio::test]
    async fn seek_is_clamped_to_duration() {
        let (tx, rx) = flume::unbounded();
        let mut element = SimulatedElement::new(tx, Duration::from_millis(10));
        element.load(1, &url(), Some(Duration::from_secs(5))).unwrap();
        let _ = media_kinds(&rx);

        element.seek(Duration::from_secs(9));

        assert_eq!(element.position(), Duration::from_secs(5));
        assert_eq!(
            media_kinds(&rx),
            vec![MediaEventKind::TimeUpdate(Duration::from_secs(5))]
        );
    }
}
