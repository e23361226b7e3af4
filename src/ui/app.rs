use std::sync::Arc;

use flume::Receiver;
use ratatui::Frame;
use tracing::{info, warn};

use crate::{
    audio::{report::ApiPlayReporter, system::AudioSystem},
    config::AppConfig,
    event::events::Event,
    http::ApiService,
    session::{RecentSearches, Session},
    storage::{FileStore, KeyValueStore, MemoryStore},
    util::task::TaskManager,
};

use super::{
    context::AppContext,
    layout::AppLayout,
    router::Router,
    state::{AppState, Route},
    tui::Tui,
    util::handler::EventHandler,
    views::view_for,
};

pub struct App {
    pub ctx: AppContext,
    pub state: AppState,
    pub router: Router,
    pub task_manager: TaskManager,
    pub event_rx: Receiver<Event>,
    pub has_focus: bool,
    pub should_quit: bool,
}

impl App {
    pub async fn new(config: AppConfig) -> color_eyre::Result<Self> {
        let (event_tx, event_rx) = flume::unbounded();

        let store: Arc<dyn KeyValueStore> = match FileStore::open(config.storage_dir()) {
            Ok(store) => Arc::new(store),
            Err(err) => {
                warn!(error = %err, "Storage unavailable, nothing will persist");
                Arc::new(MemoryStore::default())
            }
        };

        let api = Arc::new(ApiService::new(&config)?);
        let session = Session::restore(api.clone(), store.clone());
        let recent_searches = RecentSearches::load(store.clone());
        let reporter = Arc::new(ApiPlayReporter::new(api.clone()));
        let audio_system = AudioSystem::new(&config, event_tx.clone(), store, reporter);

        let route = if session.is_authenticated() {
            Route::Home
        } else {
            Route::Auth
        };
        let mut state = AppState::default();
        state.ui.current_route = route;
        state.ui.sidebar_index = route.index().unwrap_or(0);

        info!(api = %config.api_url, authenticated = session.is_authenticated(), "Starting");

        Ok(Self {
            ctx: AppContext {
                api,
                audio_system,
                session,
                recent_searches,
                event_tx,
                config,
            },
            state,
            router: Router::new(view_for(route)),
            task_manager: TaskManager::new(),
            event_rx,
            has_focus: true,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> color_eyre::Result<()> {
        let mut tui = Tui::new()?.mouse(true).paste(true);
        tui.enter()?;

        if self.ctx.session.is_authenticated() {
            EventHandler::refresh_session_data(self);
        }
        self.router.mount_active(&self.ctx).await;

        while !self.should_quit {
            tui.draw(|f| self.ui(f))?;
            EventHandler::handle_events(self, &mut tui).await?;
        }

        tui.exit()?;
        Ok(())
    }

    fn ui(&mut self, frame: &mut Frame) {
        if self.has_focus {
            let area = frame.area();
            AppLayout::new(self).render(frame, area);
        }
    }
}
