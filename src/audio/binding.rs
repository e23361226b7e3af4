use std::{sync::Arc, time::Duration};

use tracing::{debug, warn};

use crate::audio::{
    element::{MediaEvent, MediaEventKind},
    error::MediaError,
    progress::TrackProgress,
    queue::QueueManager,
    resolver::UrlResolver,
    state::MediaStatus,
    traits::MediaElement,
};

/// Keeps a [`MediaElement`] in step with the [`QueueManager`]: loads the
/// selected track, applies the playing flag, tracks progress, and turns
/// `Ended` into a completion report plus `next()`.
pub struct MediaBinding {
    element: Box<dyn MediaElement>,
    resolver: UrlResolver,
    progress: TrackProgress,
    status: MediaStatus,
    loaded_selection: Option<u64>,
    has_source: bool,
    load_token: u64,
    applied_playing: bool,
    volume: u8,
    is_muted: bool,
}

impl MediaBinding {
    pub fn new(element: Box<dyn MediaElement>, resolver: UrlResolver, volume: u8) -> Self {
        let mut binding = Self {
            element,
            resolver,
            progress: TrackProgress::new(),
            status: MediaStatus::Idle,
            loaded_selection: None,
            has_source: false,
            load_token: 0,
            applied_playing: false,
            volume: volume.min(100),
            is_muted: false,
        };
        binding.apply_volume();
        binding
    }

    pub fn sync(&mut self, queue: &QueueManager) {
        if self.loaded_selection != Some(queue.selection()) {
            self.loaded_selection = Some(queue.selection());
            self.applied_playing = false;
            match queue.current_track() {
                Some(track) => {
                    let hint = (track.duration > 0)
                        .then(|| Duration::from_secs(u64::from(track.duration)));
                    let url = self.resolver.resolve(track);
                    self.load(url, hint);
                }
                None => {
                    self.element.pause();
                    self.has_source = false;
                    self.status = MediaStatus::Idle;
                }
            }
        }

        let wanted = queue.is_playing() && self.has_source;
        if wanted == self.applied_playing {
            return;
        }
        if !wanted {
            self.element.pause();
            self.applied_playing = false;
            return;
        }
        if self.is_blocked() {
            return;
        }
        match self.element.play() {
            Ok(()) => self.applied_playing = true,
            Err(e) => self.fail(e),
        }
    }

    fn load(&mut self, url: Result<url::Url, MediaError>, hint: Option<Duration>) {
        self.load_token += 1;
        self.progress.reset();
        self.status = MediaStatus::Loading;

        let result = url.and_then(|url| {
            debug!(%url, token = self.load_token, "Loading track");
            self.element.load(self.load_token, &url, hint)
        });
        match result {
            Ok(()) => {
                self.has_source = true;
                if let Some(hint) = hint {
                    self.progress.set_total_duration(hint);
                }
            }
            Err(e) => {
                self.has_source = false;
                self.fail(e);
            }
        }
    }

    fn fail(&mut self, error: MediaError) {
        warn!(error = %error, "Media error");
        self.status = MediaStatus::Error(error.to_string());
    }

    /// Applies an element event. Events for an older load are ignored.
    pub fn on_media_event(&mut self, event: MediaEvent, queue: &mut QueueManager) {
        if event.token != self.load_token {
            return;
        }
        match event.kind {
            MediaEventKind::LoadStart => {
                if !self.is_blocked() {
                    self.status = MediaStatus::Loading;
                }
            }
            MediaEventKind::CanPlay => {
                if self.status.is_loading() {
                    self.status = MediaStatus::Ready;
                }
            }
            MediaEventKind::DurationChange(duration) => {
                self.progress.set_total_duration(duration);
            }
            MediaEventKind::TimeUpdate(position) => {
                self.progress.set_current_position(position);
            }
            MediaEventKind::Ended => {
                if let Some(track) = queue.current_track() {
                    queue.report_completed(track, 100);
                }
                if queue.next().is_none() {
                    queue.pause();
                }
                self.sync(queue);
            }
            MediaEventKind::Error(message) => {
                warn!(%message, "Media element error");
                self.applied_playing = false;
                self.status = MediaStatus::Error(message);
            }
        }
    }

    /// `fraction` of the known duration; nothing happens while it is unknown.
    pub fn seek_fraction(&mut self, fraction: f64) {
        let Some(duration) = self.known_duration() else {
            return;
        };
        let target = duration.mul_f64(fraction.clamp(0.0, 1.0));
        self.seek_to(target);
    }

    pub fn seek_by(&mut self, offset_secs: i64) {
        let Some(duration) = self.known_duration() else {
            return;
        };
        let current = self.progress.position().as_secs_f64();
        let target = (current + offset_secs as f64).clamp(0.0, duration.as_secs_f64());
        self.seek_to(Duration::from_secs_f64(target));
    }

    fn seek_to(&mut self, target: Duration) {
        self.element.seek(target);
        self.progress.set_current_position(target);
    }

    fn known_duration(&self) -> Option<Duration> {
        if !self.has_source {
            return None;
        }
        self.progress.duration().or_else(|| self.element.duration())
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.set_volume_percent((volume.clamp(0.0, 1.0) * 100.0).round() as u8);
    }

    pub fn set_volume_percent(&mut self, volume: u8) {
        self.volume = volume.min(100);
        self.is_muted = false;
        self.apply_volume();
    }

    pub fn volume_up(&mut self, amount: u8) {
        self.set_volume_percent(self.volume.saturating_add(amount));
    }

    pub fn volume_down(&mut self, amount: u8) {
        self.set_volume_percent(self.volume.saturating_sub(amount));
    }

    pub fn toggle_mute(&mut self) {
        self.is_muted = !self.is_muted;
        self.apply_volume();
    }

    fn apply_volume(&mut self) {
        let volume = if self.is_muted {
            0.0
        } else {
            f32::from(self.volume) / 100.0
        };
        self.element.set_volume(volume);
    }

    /// Effective volume in `[0.0, 1.0]`.
    pub fn volume(&self) -> f32 {
        f32::from(self.volume) / 100.0
    }

    pub fn volume_percent(&self) -> u8 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.is_muted
    }

    pub fn progress(&self) -> &TrackProgress {
        &self.progress
    }

    pub fn status(&self) -> &MediaStatus {
        &self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.status.error()
    }

    /// Play/pause is disabled until the next track load clears the error.
    pub fn is_blocked(&self) -> bool {
        self.error().is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        audio::testing::{FakeElement, RecordingReporter, track},
        storage::MemoryStore,
    };
    use url::Url;

    struct Harness {
        binding: MediaBinding,
        queue: QueueManager,
        element: FakeElement,
        reporter: Arc<RecordingReporter>,
    }

    fn harness() -> Harness {
        let element = FakeElement::default();
        let reporter = Arc::new(RecordingReporter::default());
        let queue = QueueManager::new(Arc::new(MemoryStore::new()), reporter.clone());
        let resolver = UrlResolver::new(Url::parse("http://localhost:8000").unwrap());
        Harness {
            binding: MediaBinding::new(Box::new(element.clone()), resolver, 70),
            queue,
            element,
            reporter,
        }
    }

    impl Harness {
        fn play(&mut self, ids: &[i64], start: usize) {
            let list: Vec<_> = ids.iter().map(|&id| track(id, 180)).collect();
            self.queue.play(list[start].clone(), list);
            self.binding.sync(&self.queue);
        }

        fn event(&mut self, kind: MediaEventKind) {
            let token = self.element.state().last_token;
            self.binding
                .on_media_event(MediaEvent { token, kind }, &mut self.queue);
        }
    }

    #[test]
    fn track_change_loads_resolved_url_and_resets_progress() {
        let mut h = harness();
        h.play(&[1, 2], 0);
        h.event(MediaEventKind::TimeUpdate(Duration::from_secs(90)));
        assert_eq!(h.binding.progress().percent(), 50);

        h.queue.next();
        h.binding.sync(&h.queue);

        let state = h.element.state();
        assert_eq!(
            state.loaded,
            vec![
                "http://localhost:8000/media/tracks/1.mp3".to_string(),
                "http://localhost:8000/media/tracks/2.mp3".to_string(),
            ]
        );
        assert!(state.playing);
        assert_eq!(h.binding.progress().position(), Duration::ZERO);
    }

    #[test]
    fn playing_flag_is_applied_to_the_element() {
        let mut h = harness();
        h.play(&[1], 0);
        assert!(h.element.state().playing);

        h.queue.toggle_play_pause();
        h.binding.sync(&h.queue);
        assert!(!h.element.state().playing);
        assert_eq!(h.element.state().loaded.len(), 1);
    }

    #[test]
    fn ended_reports_completion_then_advances() {
        let mut h = harness();
        h.play(&[1, 2], 0);

        h.event(MediaEventKind::Ended);

        assert_eq!(h.queue.current_track().map(|t| t.id), Some(2));
        assert_eq!(h.queue.current_index(), 1);
        assert!(h.queue.is_playing());

        let reports = h.reporter.reports();
        let completion = reports.iter().find(|(_, r)| r.is_completion()).unwrap();
        assert_eq!(completion.0, 1);
        assert_eq!(completion.1.listen_percentage, Some(100));
        assert_eq!(h.element.state().loaded.len(), 2);
    }

    #[test]
    fn ended_on_last_track_without_repeat_pauses() {
        let mut h = harness();
        h.play(&[1], 0);

        h.event(MediaEventKind::Ended);

        assert_eq!(h.queue.current_track().map(|t| t.id), Some(1));
        assert!(!h.queue.is_playing());
        assert!(!h.element.state().playing);
    }

    #[test]
    fn single_track_repeat_reloads_the_same_track() {
        let mut h = harness();
        h.play(&[1], 0);
        h.queue.toggle_repeat();

        h.event(MediaEventKind::Ended);

        assert_eq!(h.element.state().loaded.len(), 2);
        assert!(h.element.state().playing);
    }

    #[test]
    fn play_failure_sets_error_and_keeps_playing_flag() {
        let mut h = harness();
        h.element.fail_play(true);
        h.play(&[1, 2], 0);

        assert!(h.binding.is_blocked());
        assert!(h.queue.is_playing());
        assert!(!h.element.state().playing);
    }

    #[test]
    fn error_blocks_play_until_track_change() {
        let mut h = harness();
        h.play(&[1, 2], 0);
        h.event(MediaEventKind::Error("decode failed".into()));
        assert_eq!(h.binding.error(), Some("decode failed"));

        h.queue.toggle_play_pause();
        h.binding.sync(&h.queue);
        h.queue.toggle_play_pause();
        h.binding.sync(&h.queue);
        assert_eq!(h.element.state().play_calls, 1);

        h.queue.next();
        h.binding.sync(&h.queue);
        assert!(!h.binding.is_blocked());
        assert_eq!(h.element.state().play_calls, 2);
    }

    #[test]
    fn stale_events_are_ignored() {
        let mut h = harness();
        h.play(&[1, 2], 0);
        let stale = h.element.state().last_token;
        h.queue.next();
        h.binding.sync(&h.queue);

        h.binding.on_media_event(
            MediaEvent {
                token: stale,
                kind: MediaEventKind::Ended,
            },
            &mut h.queue,
        );

        assert_eq!(h.queue.current_track().map(|t| t.id), Some(2));
    }

    #[test]
    fn seek_requires_a_known_duration() {
        let mut h = harness();
        h.queue.play(track(1, 0), Vec::new());
        h.binding.sync(&h.queue);

        h.binding.seek_fraction(0.5);
        assert!(h.element.state().seeks.is_empty());

        h.event(MediaEventKind::DurationChange(Duration::from_secs(200)));
        h.binding.seek_fraction(0.5);
        h.binding.seek_fraction(7.0);
        assert_eq!(
            h.element.state().seeks,
            vec![Duration::from_secs(100), Duration::from_secs(200)]
        );
    }

    #[test]
    fn loading_flag_spans_load_start_to_can_play() {
        let mut h = harness();
        h.play(&[1], 0);
        assert!(h.binding.is_loading());

        h.event(MediaEventKind::CanPlay);
        assert!(!h.binding.is_loading());
        assert_eq!(h.binding.status(), &MediaStatus::Ready);
    }

    #[test]
    fn volume_is_clamped() {
        let mut h = harness();
        assert!((h.element.state().volume - 0.7).abs() < f32::EPSILON);

        h.binding.set_volume(1.5);
        assert_eq!(h.binding.volume_percent(), 100);
        h.binding.set_volume(-1.0);
        assert_eq!(h.binding.volume_percent(), 0);

        h.binding.volume_up(5);
        h.binding.toggle_mute();
        assert_eq!(h.element.state().volume, 0.0);
        assert_eq!(h.binding.volume_percent(), 5);
    }
}
