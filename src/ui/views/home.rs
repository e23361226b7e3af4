use async_trait::async_trait;
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Stylize,
    text::Line,
    widgets::Paragraph,
};

use crate::{
    event::events::Event,
    ui::{
        components::track_list::TrackList,
        context::AppContext,
        state::AppState,
        traits::{Action, View},
        util::fetch,
    },
    util::{colors, task::TaskManager},
};

/// Landing page: what is trending and what the recommender picked for you.
pub struct Home {
    trending: TrackList,
    for_you: TrackList,
    focus_for_you: bool,
    tasks: TaskManager,
}

impl Default for Home {
    fn default() -> Self {
        Self {
            trending: TrackList::new("Trending"),
            for_you: TrackList::new("For you"),
            focus_for_you: false,
            tasks: TaskManager::new(),
        }
    }
}

impl Home {
    fn focused(&mut self) -> &mut TrackList {
        if self.focus_for_you {
            &mut self.for_you
        } else {
            &mut self.trending
        }
    }
}

#[async_trait]
impl View for Home {
    async fn on_mount(&mut self, ctx: &AppContext) {
        let api = ctx.api.clone();
        self.tasks.spawn(
            "trending",
            fetch(
                ctx.event_tx.clone(),
                "Loading trending",
                async move { api.fetch_trending().await },
                Event::TrendingFetched,
            ),
        );

        let api = ctx.api.clone();
        self.tasks.spawn(
            "for_you",
            fetch(
                ctx.event_tx.clone(),
                "Loading recommendations",
                async move { api.fetch_for_you().await },
                Event::ForYouFetched,
            ),
        );
    }

    async fn on_event(&mut self, event: &Event, _ctx: &AppContext) {
        match event {
            Event::TrendingFetched(tracks) => self.trending.set_tracks(tracks.clone()),
            Event::ForYouFetched(tracks) => self.for_you.set_tracks(tracks.clone()),
            Event::FetchError(_) => {
                self.trending.loading = false;
                self.for_you.loading = false;
            }
            _ => {}
        }
    }

    fn render(&mut self, f: &mut Frame, area: Rect, _state: &AppState, ctx: &AppContext) {
        let [header, trending, for_you] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Percentage(50),
            Constraint::Percentage(50),
        ])
        .areas(area);

        let name = ctx
            .session
            .user()
            .map(|u| u.display_name())
            .unwrap_or_default();
        f.render_widget(
            Paragraph::new(Line::from(vec![
                " Welcome back, ".fg(colors::SECONDARY),
                name.fg(colors::PRIMARY).bold(),
            ])),
            header,
        );

        let focus_for_you = self.focus_for_you;
        self.trending.render(f, trending, ctx, !focus_for_you);
        self.for_you.render(f, for_you, ctx, focus_for_you);
    }

    async fn handle_input(
        &mut self,
        key: KeyEvent,
        _state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action> {
        match key.code {
            KeyCode::Char('h') | KeyCode::Char('l') | KeyCode::Left | KeyCode::Right => {
                self.focus_for_you = !self.focus_for_you;
                Some(Action::None)
            }
            _ => self.focused().handle_key(key, ctx),
        }
    }
}
