//! State that must survive a restart, written through the file store.

use std::sync::Arc;

use musrec::{
    audio::{queue::QueueManager, traits::PlayReporter},
    http::{
        ApiService,
        models::{LoginResponse, PlayInteraction, Track, TrackId},
    },
    session::{RecentSearches, Session},
    storage::{FileStore, KeyValueStore, keys},
};

struct NoopReporter;

impl PlayReporter for NoopReporter {
    fn report(&self, _track_id: TrackId, _interaction: PlayInteraction) {}
}

fn open_store(dir: &tempfile::TempDir) -> Arc<dyn KeyValueStore> {
    Arc::new(FileStore::open(dir.path().join("storage")).unwrap())
}

fn api() -> Arc<ApiService> {
    Arc::new(ApiService::with_base_url("http://localhost:8000/api").unwrap())
}

fn track(id: TrackId) -> Track {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": format!("Track {id}"),
        "duration": 120,
        "audio_file": format!("/media/tracks/{id}.mp3")
    }))
    .unwrap()
}

mod file_store {
    use super::*;

    #[test]
    fn values_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        open_store(&dir).set("token", "abc").unwrap();

        let reopened = open_store(&dir);
        assert_eq!(reopened.get("token").unwrap().as_deref(), Some("abc"));

        reopened.remove("token").unwrap();
        assert_eq!(open_store(&dir).get("token").unwrap(), None);
    }

    #[test]
    fn removing_a_missing_key_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        assert!(open_store(&dir).remove("never_written").is_ok());
    }

    #[test]
    fn path_like_keys_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        assert!(store.set("../escape", "x").is_err());
        assert!(store.get("a/b").is_err());
    }
}

mod session {
    use super::*;

    #[test]
    fn login_is_restored_on_next_start() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::restore(api(), open_store(&dir));
        assert!(!session.is_authenticated());

        session.apply_login(&LoginResponse {
            token: "abc".into(),
            user_id: 3,
            username: "ann".into(),
            email: "ann@example.com".into(),
        });

        let client = api();
        let restored = Session::restore(client.clone(), open_store(&dir));
        assert!(restored.is_authenticated());
        assert_eq!(restored.user().map(|u| u.id), Some(3));
        assert_eq!(client.token().as_deref(), Some("abc"));
    }

    #[test]
    fn token_without_user_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        store.set(keys::TOKEN, "orphan").unwrap();

        let client = api();
        let session = Session::restore(client.clone(), store.clone());
        assert!(!session.is_authenticated());
        assert!(client.token().is_none());
        assert_eq!(store.get(keys::TOKEN).unwrap(), None);
    }

    #[test]
    fn corrupt_user_record_logs_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        store.set(keys::TOKEN, "abc").unwrap();
        store.set(keys::USER, "{not json").unwrap();

        let session = Session::restore(api(), store.clone());
        assert!(!session.is_authenticated());
        assert_eq!(store.get(keys::USER).unwrap(), None);
    }
}

mod player {
    use super::*;

    #[test]
    fn queue_and_index_survive_but_playback_does_not_resume() {
        let dir = tempfile::tempdir().unwrap();
        let reporter: Arc<dyn PlayReporter> = Arc::new(NoopReporter);

        let mut player = QueueManager::new(open_store(&dir), reporter.clone());
        player.set_queue(vec![track(1), track(2), track(3)], 1);
        assert!(player.is_playing());

        let restored = QueueManager::restore(open_store(&dir), reporter);
        assert_eq!(restored.current_track().map(|t| t.id), Some(2));
        assert_eq!(restored.queue().len(), 3);
        assert_eq!(restored.current_index(), 1);
        assert!(!restored.is_playing());
    }

    #[test]
    fn garbage_player_state_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        store.set(keys::PLAYER_STATE, "[]").unwrap();

        let restored = QueueManager::restore(store, Arc::new(NoopReporter));
        assert!(restored.current_track().is_none());
        assert!(restored.queue().is_empty());
    }
}

mod recent_searches {
    use super::*;

    #[test]
    fn recent_searches_persist_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut recent = RecentSearches::load(open_store(&dir));
        for query in ["jazz", "rock", "jazz", "lofi"] {
            recent.record(query);
        }

        let reloaded = RecentSearches::load(open_store(&dir));
        assert_eq!(reloaded.entries(), ["lofi", "jazz", "rock"]);
    }

    #[test]
    fn clearing_removes_the_stored_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let mut recent = RecentSearches::load(store.clone());
        recent.record("jazz");
        recent.clear();

        assert_eq!(store.get(keys::RECENT_SEARCHES).unwrap(), None);
        assert!(RecentSearches::load(store).entries().is_empty());
    }
}
