use std::sync::Arc;

use flume::Sender;

use crate::{
    audio::{
        binding::MediaBinding,
        config::AudioConfig,
        element::{self, MediaEvent},
        progress::TrackProgress,
        queue::QueueManager,
        resolver::UrlResolver,
        traits::{MediaElement, PlayReporter},
    },
    config::AppConfig,
    event::events::Event,
    http::models::Track,
    storage::KeyValueStore,
};

/// The player as the UI sees it. Every engine mutation is followed by a
/// binding sync so the media element always reflects the engine state.
pub struct AudioSystem {
    queue: QueueManager,
    binding: MediaBinding,
    config: AudioConfig,
}

impl AudioSystem {
    pub fn new(
        config: &AppConfig,
        event_tx: Sender<Event>,
        store: Arc<dyn KeyValueStore>,
        reporter: Arc<dyn PlayReporter>,
    ) -> Self {
        let element = element::default_element(event_tx, &config.audio);
        Self::with_element(config, element, store, reporter)
    }

    pub fn with_element(
        config: &AppConfig,
        element: Box<dyn MediaElement>,
        store: Arc<dyn KeyValueStore>,
        reporter: Arc<dyn PlayReporter>,
    ) -> Self {
        let queue = QueueManager::restore(store, reporter);
        let resolver = UrlResolver::new(config.media_origin.clone());
        let binding = MediaBinding::new(element, resolver, config.audio.volume);

        let mut system = Self {
            queue,
            binding,
            config: config.audio.clone(),
        };
        system.sync();
        system
    }

    fn sync(&mut self) {
        self.binding.sync(&self.queue);
    }

    pub fn play(&mut self, track: Track, queue: Vec<Track>) {
        self.queue.play(track, queue);
        self.sync();
    }

    pub fn set_queue(&mut self, tracks: Vec<Track>, start_index: usize) {
        self.queue.set_queue(tracks, start_index);
        self.sync();
    }

    /// Ignored while a media error is shown.
    pub fn play_pause(&mut self) {
        if self.binding.is_blocked() {
            return;
        }
        self.queue.toggle_play_pause();
        self.sync();
    }

    pub fn pause(&mut self) {
        self.queue.pause();
        self.sync();
    }

    pub fn play_next(&mut self) {
        self.queue.next();
        self.sync();
    }

    pub fn play_previous(&mut self) {
        self.queue.previous();
        self.sync();
    }

    pub fn add_to_queue(&mut self, tracks: Vec<Track>) {
        self.queue.add_to_queue(tracks);
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear_queue();
    }

    pub fn toggle_shuffle(&mut self) {
        self.queue.toggle_shuffle();
    }

    pub fn toggle_repeat(&mut self) {
        self.queue.toggle_repeat();
    }

    pub fn on_media_event(&mut self, event: MediaEvent) {
        self.binding.on_media_event(event, &mut self.queue);
    }

    pub fn seek_fraction(&mut self, fraction: f64) {
        self.binding.seek_fraction(fraction);
    }

    pub fn seek_forwards(&mut self) {
        self.binding.seek_by(self.config.seek_step_secs as i64);
    }

    pub fn seek_backwards(&mut self) {
        self.binding.seek_by(-(self.config.seek_step_secs as i64));
    }

    pub fn volume_up(&mut self) {
        self.binding.volume_up(self.config.volume_step);
    }

    pub fn volume_down(&mut self) {
        self.binding.volume_down(self.config.volume_step);
    }

    pub fn toggle_mute(&mut self) {
        self.binding.toggle_mute();
    }

    pub fn queue(&self) -> &QueueManager {
        &self.queue
    }

    pub fn binding(&self) -> &MediaBinding {
        &self.binding
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.queue.current_track()
    }

    pub fn is_playing(&self) -> bool {
        self.queue.is_playing()
    }

    pub fn progress(&self) -> &TrackProgress {
        self.binding.progress()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        audio::testing::{FakeElement, RecordingReporter, track},
        storage::MemoryStore,
    };
    use std::collections::HashMap;

    fn config() -> AppConfig {
        let vars: HashMap<&str, &str> = [("MUSREC_DATA_DIR", "/tmp/musrec-test")].into();
        AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap()
    }

    fn system(store: Arc<MemoryStore>) -> (AudioSystem, FakeElement) {
        let element = FakeElement::default();
        let system = AudioSystem::with_element(
            &config(),
            Box::new(element.clone()),
            store,
            Arc::new(RecordingReporter::default()),
        );
        (system, element)
    }

    #[test]
    fn restored_track_is_loaded_but_not_played() {
        let store = Arc::new(MemoryStore::new());
        {
            let (mut first, _) = system(store.clone());
            first.play(track(1, 100), vec![track(1, 100), track(2, 100)]);
        }

        let (restored, element) = system(store);

        assert_eq!(restored.current_track().map(|t| t.id), Some(1));
        assert_eq!(element.state().loaded.len(), 1);
        assert!(!element.state().playing);
    }

    #[test]
    fn play_pause_is_ignored_while_blocked() {
        let (mut system, element) = system(Arc::new(MemoryStore::new()));
        element.fail_play(true);
        system.play(track(1, 100), vec![track(1, 100)]);
        assert!(system.binding().is_blocked());

        system.play_pause();

        assert!(system.is_playing());
    }

    #[test]
    fn seek_steps_use_configured_amount() {
        let (mut system, element) = system(Arc::new(MemoryStore::new()));
        system.play(track(1, 100), vec![track(1, 100)]);

        system.seek_forwards();
        system.seek_forwards();
        system.seek_backwards();

        assert_eq!(
            element.state().seeks,
            vec![
                std::time::Duration::from_secs(5),
                std::time::Duration::from_secs(10),
                std::time::Duration::from_secs(5),
            ]
        );
    }
}
