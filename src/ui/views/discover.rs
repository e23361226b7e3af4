use async_trait::async_trait;
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Tabs},
};

use crate::{
    event::events::Event,
    http::models::Genre,
    ui::{
        components::track_list::TrackList,
        context::AppContext,
        state::AppState,
        traits::{Action, View},
        util::fetch,
    },
    util::{colors, task::TaskManager},
};

const COLLABORATIVE: usize = 0;
const CONTENT_BASED: usize = 1;
const POPULAR: usize = 2;
const SIMILAR: usize = 3;
const GENRE: usize = 4;

/// Recommendations split by strategy, plus browsing by genre.
pub struct Discover {
    genres: Vec<Genre>,
    genre_state: ListState,
    selected_genre: Option<i64>,
    sections: [TrackList; 5],
    section: usize,
    genres_focused: bool,
    tasks: TaskManager,
}

impl Default for Discover {
    fn default() -> Self {
        let mut genre = TrackList::new("Genre");
        genre.loading = false;
        Self {
            genres: Vec::new(),
            genre_state: ListState::default(),
            selected_genre: None,
            sections: [
                TrackList::new("Listeners like you"),
                TrackList::new("Matches your taste"),
                TrackList::new("Popular"),
                TrackList::new("Similar to your likes"),
                genre,
            ],
            section: COLLABORATIVE,
            genres_focused: false,
            tasks: TaskManager::new(),
        }
    }
}

impl Discover {
    fn fetch_recommendations(&mut self, ctx: &AppContext) {
        let api = ctx.api.clone();
        self.tasks.spawn(
            "by_type",
            fetch(
                ctx.event_tx.clone(),
                "Loading recommendations",
                async move { api.fetch_recommendations_by_type().await },
                Event::RecommendationsByTypeFetched,
            ),
        );

        let api = ctx.api.clone();
        self.tasks.spawn(
            "similar",
            fetch(
                ctx.event_tx.clone(),
                "Loading similar tracks",
                async move { api.fetch_similar_tracks().await },
                Event::SimilarTracksFetched,
            ),
        );
    }

    fn select_genre(&mut self, ctx: &AppContext) {
        let Some(genre) = self.genre_state.selected().and_then(|i| self.genres.get(i)) else {
            return;
        };
        self.selected_genre = Some(genre.id);
        let list = &mut self.sections[GENRE];
        list.title = genre.name.clone();
        list.loading = true;
        self.section = GENRE;
        self.genres_focused = false;
        let _ = ctx.event_tx.send(Event::LoadGenre(genre.id));
    }

    fn handle_genre_key(&mut self, key: KeyEvent, ctx: &AppContext) -> Option<Action> {
        let count = self.genres.len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down if count > 0 => {
                let next = self.genre_state.selected().map_or(0, |i| (i + 1).min(count - 1));
                self.genre_state.select(Some(next));
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let prev = self.genre_state.selected().map_or(0, |i| i.saturating_sub(1));
                self.genre_state.select(Some(prev));
            }
            KeyCode::Enter => self.select_genre(ctx),
            _ => return None,
        }
        Some(Action::None)
    }

    fn render_genres(&mut self, f: &mut Frame, area: Rect) {
        let border = if self.genres_focused { colors::SECONDARY } else { colors::NEUTRAL };
        let items: Vec<ListItem> = self
            .genres
            .iter()
            .map(|g| {
                let style = if Some(g.id) == self.selected_genre {
                    Style::default().fg(colors::PRIMARY)
                } else {
                    Style::default().fg(colors::SECONDARY)
                };
                ListItem::new(format!(" {}", g.name)).style(style)
            })
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(border))
                    .title(" Genres "),
            )
            .highlight_style(Style::default().bg(colors::NEUTRAL).add_modifier(Modifier::BOLD));
        f.render_stateful_widget(list, area, &mut self.genre_state);
    }
}

#[async_trait]
impl View for Discover {
    async fn on_mount(&mut self, ctx: &AppContext) {
        let api = ctx.api.clone();
        self.tasks.spawn(
            "genres",
            fetch(
                ctx.event_tx.clone(),
                "Loading genres",
                async move { api.fetch_genres().await },
                Event::GenresFetched,
            ),
        );
        self.fetch_recommendations(ctx);
    }

    async fn on_event(&mut self, event: &Event, ctx: &AppContext) {
        match event {
            Event::GenresFetched(genres) => {
                self.genres = genres.clone();
                if self.genre_state.selected().is_none() && !self.genres.is_empty() {
                    self.genre_state.select(Some(0));
                }
            }
            Event::RecommendationsByTypeFetched(by_type) => {
                self.sections[COLLABORATIVE].set_tracks(by_type.collaborative.clone());
                self.sections[CONTENT_BASED].set_tracks(by_type.content_based.clone());
                self.sections[POPULAR].set_tracks(by_type.popularity.clone());
            }
            Event::SimilarTracksFetched(tracks) => self.sections[SIMILAR].set_tracks(tracks.clone()),
            Event::GenreTracksFetched(id, tracks) if Some(*id) == self.selected_genre => {
                self.sections[GENRE].set_tracks(tracks.clone());
            }
            Event::RecommendationsRefreshed(_) => {
                for list in &mut self.sections[..GENRE] {
                    list.loading = true;
                }
                self.fetch_recommendations(ctx);
            }
            Event::FetchError(_) => {
                for list in &mut self.sections {
                    list.loading = false;
                }
            }
            _ => {}
        }
    }

    fn render(&mut self, f: &mut Frame, area: Rect, _state: &AppState, ctx: &AppContext) {
        let [genres_area, main] =
            Layout::horizontal([Constraint::Length(22), Constraint::Min(1)]).areas(area);
        let [tabs_area, list_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).areas(main);

        self.render_genres(f, genres_area);

        let titles: Vec<Line> = self
            .sections
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != GENRE || self.selected_genre.is_some())
            .map(|(_, list)| Line::from(list.title.clone()))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.section)
            .style(Style::default().fg(colors::SECONDARY))
            .highlight_style(Style::default().fg(colors::PRIMARY).add_modifier(Modifier::BOLD));
        f.render_widget(tabs, tabs_area);

        let focused = !self.genres_focused;
        self.sections[self.section].render(f, list_area, ctx, focused);

        if self.section != GENRE {
            let hint = Line::from(" R: refresh recommendations ".fg(colors::NEUTRAL)).right_aligned();
            f.render_widget(hint, tabs_area);
        }
    }

    async fn handle_input(
        &mut self,
        key: KeyEvent,
        _state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action> {
        let section_count = if self.selected_genre.is_some() { GENRE + 1 } else { GENRE };
        match key.code {
            KeyCode::Left | KeyCode::Right => {
                self.genres_focused = !self.genres_focused;
                Some(Action::None)
            }
            KeyCode::Char(']') => {
                self.section = (self.section + 1) % section_count;
                Some(Action::None)
            }
            KeyCode::Char('[') => {
                self.section = (self.section + section_count - 1) % section_count;
                Some(Action::None)
            }
            KeyCode::Char('R') => {
                let _ = ctx.event_tx.send(Event::RefreshRecommendations);
                Some(Action::None)
            }
            _ if self.genres_focused => self.handle_genre_key(key, ctx),
            _ => self.sections[self.section].handle_key(key, ctx),
        }
    }
}
