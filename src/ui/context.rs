use std::sync::Arc;

use flume::Sender;

use crate::{
    audio::system::AudioSystem,
    config::AppConfig,
    event::events::Event,
    http::ApiService,
    session::{RecentSearches, Session},
};

/// Shared services handed to every view. Only the event handler mutates it.
pub struct AppContext {
    pub api: Arc<ApiService>,
    pub audio_system: AudioSystem,
    pub session: Session,
    pub recent_searches: RecentSearches,
    pub event_tx: Sender<Event>,
    pub config: AppConfig,
}
