use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    audio::traits::PlayReporter,
    http::models::{PlayInteraction, Track},
    storage::{KeyValueStore, keys, load_json, save_json},
};

/// What survives a restart: current track, queue and index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub track: Option<Track>,
    #[serde(default)]
    pub queue: Vec<Track>,
    #[serde(default)]
    pub index: usize,
}

/// Current track, play queue and transport flags.
///
/// The engine never talks to a media element. It bumps a selection
/// counter whenever a track is (re)selected and the media binding picks
/// that up on its next sync.
pub struct QueueManager {
    queue: Vec<Track>,
    current_track: Option<Track>,
    current_track_index: usize,
    is_playing: bool,
    is_shuffled: bool,
    repeat: bool,
    selection: u64,

    store: Arc<dyn KeyValueStore>,
    reporter: Arc<dyn PlayReporter>,
}

enum Step {
    Forward,
    Backward,
}

impl QueueManager {
    pub fn new(store: Arc<dyn KeyValueStore>, reporter: Arc<dyn PlayReporter>) -> Self {
        Self {
            queue: Vec::new(),
            current_track: None,
            current_track_index: 0,
            is_playing: false,
            is_shuffled: false,
            repeat: false,
            selection: 0,
            store,
            reporter,
        }
    }

    /// Starts from the persisted snapshot when it has a track. Playback
    /// never resumes on its own.
    pub fn restore(store: Arc<dyn KeyValueStore>, reporter: Arc<dyn PlayReporter>) -> Self {
        let mut manager = Self::new(store, reporter);
        match load_json::<PlayerSnapshot>(manager.store.as_ref(), keys::PLAYER_STATE) {
            Ok(Some(snapshot)) if snapshot.track.is_some() => {
                debug!(
                    queue_len = snapshot.queue.len(),
                    index = snapshot.index,
                    "Restored player state"
                );
                manager.current_track = snapshot.track;
                manager.queue = snapshot.queue;
                manager.current_track_index = snapshot.index;
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Ignoring unreadable player state"),
        }
        manager
    }

    pub fn play(&mut self, track: Track, queue: Vec<Track>) {
        if !queue.is_empty() {
            self.current_track_index = queue.iter().position(|t| t.id == track.id).unwrap_or(0);
            self.queue = queue;
        }
        self.start(track);
        self.persist();
    }

    pub fn toggle_play_pause(&mut self) {
        self.is_playing = !self.is_playing;
    }

    pub fn pause(&mut self) {
        self.is_playing = false;
    }

    pub fn next(&mut self) -> Option<Track> {
        let target = self.target_index(Step::Forward)?;
        self.jump_to(target)
    }

    pub fn previous(&mut self) -> Option<Track> {
        let target = self.target_index(Step::Backward)?;
        self.jump_to(target)
    }

    pub fn add_to_queue(&mut self, tracks: Vec<Track>) {
        self.queue.extend(tracks);
        self.persist();
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear();
        self.current_track_index = 0;
        self.persist();
    }

    pub fn set_queue(&mut self, tracks: Vec<Track>, start_index: usize) {
        self.queue = tracks;
        self.current_track_index = start_index;
        match self.queue.get(start_index).cloned() {
            Some(track) => {
                let queue = self.queue.clone();
                self.play(track, queue);
            }
            None => self.persist(),
        }
    }

    pub fn toggle_shuffle(&mut self) {
        self.is_shuffled = !self.is_shuffled;
    }

    pub fn toggle_repeat(&mut self) {
        self.repeat = !self.repeat;
    }

    pub fn report_completed(&self, track: &Track, listen_percentage: u8) {
        self.reporter.report(
            track.id,
            PlayInteraction::completed(listen_percentage, track.duration),
        );
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            track: self.current_track.clone(),
            queue: self.queue.clone(),
            index: self.current_track_index,
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_track.as_ref()
    }

    pub fn queue(&self) -> &[Track] {
        &self.queue
    }

    pub fn current_index(&self) -> usize {
        self.current_track_index
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_shuffled(&self) -> bool {
        self.is_shuffled
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    /// Increases every time a track is selected, even the same one again.
    pub fn selection(&self) -> u64 {
        self.selection
    }

    /// `queue[index]` is the current track. Not guaranteed after
    /// `play(track, [])` or `clear_queue`.
    pub fn is_consistent(&self) -> bool {
        match &self.current_track {
            Some(track) => self
                .queue
                .get(self.current_track_index)
                .is_some_and(|t| t.id == track.id),
            None => true,
        }
    }

    fn target_index(&self, step: Step) -> Option<usize> {
        let len = self.queue.len();
        if len == 0 {
            return None;
        }
        if self.is_shuffled {
            return Some(rand::rng().random_range(0..len));
        }

        let index = self.current_track_index;
        // A restored index may point past the end; without repeat that is a no-op.
        match step {
            Step::Forward => index
                .checked_add(1)
                .filter(|&i| i < len)
                .or_else(|| self.repeat.then_some(0)),
            Step::Backward if (1..=len).contains(&index) => Some(index - 1),
            Step::Backward => self.repeat.then_some(len - 1),
        }
    }

    fn jump_to(&mut self, index: usize) -> Option<Track> {
        let track = self.queue.get(index).cloned()?;
        self.current_track_index = index;
        self.start(track.clone());
        self.persist();
        Some(track)
    }

    fn start(&mut self, track: Track) {
        let previous = self.current_track.as_ref().map(|t| t.id);
        self.reporter
            .report(track.id, PlayInteraction::started(previous));
        self.current_track = Some(track);
        self.is_playing = true;
        self.selection += 1;
    }

    fn persist(&self) {
        if let Err(e) = save_json(self.store.as_ref(), keys::PLAYER_STATE, &self.snapshot()) {
            warn!(error = %e, "Failed to persist player state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        audio::testing::{RecordingReporter, track},
        storage::{MemoryStore, StorageError},
    };

    fn manager() -> (QueueManager, Arc<RecordingReporter>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let reporter = Arc::new(RecordingReporter::default());
        (
            QueueManager::new(store.clone(), reporter.clone()),
            reporter,
            store,
        )
    }

    fn tracks(n: i64) -> Vec<Track> {
        (1..=n).map(|id| track(id, 180)).collect()
    }

    #[test]
    fn play_with_queue_selects_track_position() {
        let (mut q, reporter, _) = manager();
        let list = tracks(3);

        q.play(list[1].clone(), list.clone());

        assert_eq!(q.current_track().map(|t| t.id), Some(2));
        assert_eq!(q.current_index(), 1);
        assert!(q.is_playing());
        assert!(q.is_consistent());
        assert_eq!(reporter.started_ids(), vec![2]);
    }

    #[test]
    fn play_track_missing_from_queue_starts_at_zero() {
        let (mut q, _, _) = manager();
        q.play(track(9, 100), tracks(3));
        assert_eq!(q.current_index(), 0);
        assert_eq!(q.current_track().map(|t| t.id), Some(9));
    }

    #[test]
    fn play_with_empty_queue_keeps_queue_and_index() {
        let (mut q, _, _) = manager();
        let list = tracks(3);
        q.play(list[2].clone(), list.clone());

        q.play(track(42, 100), Vec::new());

        assert_eq!(q.queue().len(), 3);
        assert_eq!(q.current_index(), 2);
        assert_eq!(q.current_track().map(|t| t.id), Some(42));
        assert!(!q.is_consistent());
    }

    #[test]
    fn toggle_play_pause_only_flips_the_flag() {
        let (mut q, reporter, _) = manager();
        let list = tracks(2);
        q.play(list[0].clone(), list.clone());
        let before = q.snapshot();

        q.toggle_play_pause();
        assert!(!q.is_playing());
        q.toggle_play_pause();
        assert!(q.is_playing());

        assert_eq!(q.snapshot(), before);
        assert_eq!(reporter.started_ids().len(), 1);
    }

    #[test]
    fn next_and_previous_without_repeat_stop_at_the_edges() {
        let (mut q, _, _) = manager();
        let list = tracks(3);
        q.play(list[0].clone(), list.clone());

        assert!(q.previous().is_none());
        assert_eq!(q.current_index(), 0);

        assert_eq!(q.next().map(|t| t.id), Some(2));
        assert_eq!(q.next().map(|t| t.id), Some(3));
        assert!(q.next().is_none());
        assert_eq!(q.current_index(), 2);
    }

    #[test]
    fn repeat_wraps_around_both_ways() {
        let (mut q, _, _) = manager();
        let list = tracks(3);
        q.play(list[2].clone(), list.clone());
        q.toggle_repeat();

        assert_eq!(q.next().map(|t| t.id), Some(1));
        assert_eq!(q.current_index(), 0);
        assert_eq!(q.previous().map(|t| t.id), Some(3));
        assert_eq!(q.current_index(), 2);
    }

    #[test]
    fn next_at_the_last_index_changes_nothing() {
        let (mut q, reporter, _) = manager();
        let list = tracks(3);
        q.play(list[2].clone(), list.clone());
        q.pause();
        let before = (q.current_track().cloned(), q.current_index(), q.is_playing());

        assert!(q.next().is_none());

        let after = (q.current_track().cloned(), q.current_index(), q.is_playing());
        assert_eq!(after, before);
        assert_eq!(reporter.started_ids(), vec![3]);
    }

    #[test]
    fn repeat_returns_to_start_after_a_full_cycle() {
        let (mut q, _, _) = manager();
        let list = tracks(4);
        q.play(list[1].clone(), list.clone());
        q.toggle_repeat();

        for _ in 0..list.len() {
            assert!(q.next().is_some());
        }
        assert_eq!(q.current_index(), 1);
        assert_eq!(q.current_track().map(|t| t.id), Some(2));

        for _ in 0..list.len() {
            assert!(q.previous().is_some());
        }
        assert_eq!(q.current_index(), 1);
    }

    #[test]
    fn mode_toggles_leave_playback_untouched() {
        let (mut q, reporter, _) = manager();
        let list = tracks(3);
        q.play(list[1].clone(), list.clone());
        let before = (q.current_track().cloned(), q.current_index(), q.is_playing());

        q.toggle_shuffle();
        q.toggle_repeat();
        assert!(q.is_shuffled());
        assert!(q.repeat());
        assert_eq!(
            (q.current_track().cloned(), q.current_index(), q.is_playing()),
            before
        );

        q.pause();
        q.toggle_shuffle();
        q.toggle_repeat();
        assert!(!q.is_shuffled());
        assert!(!q.repeat());
        assert!(!q.is_playing());
        assert_eq!(q.current_index(), 1);
        assert_eq!(reporter.started_ids(), vec![2]);
    }

    #[test]
    fn restored_index_past_the_end_does_not_overflow() {
        let store = Arc::new(MemoryStore::new());
        let list = tracks(2);
        save_json(
            store.as_ref(),
            keys::PLAYER_STATE,
            &PlayerSnapshot {
                track: Some(list[0].clone()),
                queue: list,
                index: usize::MAX,
            },
        )
        .unwrap();

        let mut q = QueueManager::restore(store, Arc::new(RecordingReporter::default()));
        assert!(q.next().is_none());
        assert!(q.previous().is_none());
        assert_eq!(q.current_index(), usize::MAX);

        q.toggle_repeat();
        assert_eq!(q.next().map(|t| t.id), Some(1));
        assert_eq!(q.current_index(), 0);
    }

    #[test]
    fn next_after_pause_resumes_playing() {
        let (mut q, _, _) = manager();
        let list = tracks(2);
        q.play(list[0].clone(), list.clone());
        q.pause();

        q.next();
        assert!(q.is_playing());
    }

    #[test]
    fn shuffle_stays_in_bounds() {
        let (mut q, _, _) = manager();
        let list = tracks(4);
        q.play(list[0].clone(), list.clone());
        q.toggle_shuffle();

        for _ in 0..200 {
            let track = q.next().unwrap();
            assert!(q.current_index() < 4);
            assert_eq!(q.queue()[q.current_index()].id, track.id);
        }
    }

    #[test]
    fn empty_queue_is_a_no_op() {
        let (mut q, reporter, _) = manager();
        assert!(q.next().is_none());
        assert!(q.previous().is_none());
        q.toggle_shuffle();
        assert!(q.next().is_none());
        assert!(reporter.started_ids().is_empty());
    }

    #[test]
    fn add_and_clear_leave_current_track_alone() {
        let (mut q, _, _) = manager();
        let list = tracks(2);
        q.play(list[1].clone(), list.clone());

        q.add_to_queue(vec![track(3, 60), track(4, 60)]);
        let ids: Vec<_> = q.queue().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(q.current_index(), 1);
        assert_eq!(q.current_track().map(|t| t.id), Some(2));

        q.clear_queue();
        assert!(q.queue().is_empty());
        assert_eq!(q.current_index(), 0);
        assert_eq!(q.current_track().map(|t| t.id), Some(2));
    }

    #[test]
    fn set_queue_plays_the_start_track() {
        let (mut q, reporter, _) = manager();
        q.set_queue(tracks(3), 2);

        assert_eq!(q.current_track().map(|t| t.id), Some(3));
        assert_eq!(q.current_index(), 2);
        assert!(q.is_playing());
        assert_eq!(reporter.started_ids(), vec![3]);
    }

    #[test]
    fn set_queue_out_of_range_only_replaces_queue() {
        let (mut q, reporter, _) = manager();
        q.set_queue(tracks(2), 5);

        assert!(q.current_track().is_none());
        assert_eq!(q.queue().len(), 2);
        assert!(!q.is_playing());
        assert!(reporter.started_ids().is_empty());
    }

    #[test]
    fn started_reports_carry_the_previous_track() {
        let (mut q, reporter, _) = manager();
        let list = tracks(2);
        q.play(list[0].clone(), list.clone());
        q.next();

        let reports = reporter.reports();
        assert_eq!(reports[0].1.previous_track, None);
        assert_eq!(reports[1].1.previous_track, Some(1));
        assert!(reports[1].1.started_at.is_some());
    }

    #[test]
    fn completion_report_carries_percentage_and_duration() {
        let (q, reporter, _) = manager();
        q.report_completed(&track(5, 240), 100);

        let reports = reporter.reports();
        assert_eq!(reports[0].0, 5);
        assert_eq!(reports[0].1.listen_percentage, Some(100));
        assert_eq!(reports[0].1.duration, Some(240));
    }

    #[test]
    fn state_survives_a_restart() {
        let (mut q, reporter, store) = manager();
        let list = tracks(3);
        q.play(list[1].clone(), list.clone());

        let restored = QueueManager::restore(store, reporter);

        assert_eq!(restored.current_track().map(|t| t.id), Some(2));
        assert_eq!(restored.queue().len(), 3);
        assert_eq!(restored.current_index(), 1);
        assert!(!restored.is_playing());
    }

    #[test]
    fn snapshot_without_track_is_ignored() {
        let store = Arc::new(MemoryStore::new());
        save_json(
            store.as_ref(),
            keys::PLAYER_STATE,
            &PlayerSnapshot {
                track: None,
                queue: tracks(2),
                index: 1,
            },
        )
        .unwrap();

        let q = QueueManager::restore(store, Arc::new(RecordingReporter::default()));
        assert!(q.queue().is_empty());
        assert_eq!(q.current_index(), 0);
    }

    #[test]
    fn malformed_snapshot_starts_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::PLAYER_STATE, "[1, 2").unwrap();

        let q = QueueManager::restore(store, Arc::new(RecordingReporter::default()));
        assert!(q.current_track().is_none());
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _: &str) -> crate::storage::Result<Option<String>> {
            Ok(None)
        }
        fn set(&self, key: &str, _: &str) -> crate::storage::Result<()> {
            Err(StorageError::InvalidKey(key.to_string()))
        }
        fn remove(&self, _: &str) -> crate::storage::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn persistence_failure_does_not_interrupt_playback() {
        let mut q = QueueManager::new(
            Arc::new(FailingStore),
            Arc::new(RecordingReporter::default()),
        );
        let list = tracks(2);
        q.play(list[0].clone(), list.clone());
        q.next();

        assert_eq!(q.current_track().map(|t| t.id), Some(2));
        assert!(q.is_playing());
    }
}
