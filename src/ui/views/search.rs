use async_trait::async_trait;
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, BorderType, Borders, List, ListItem, ListState},
};

use crate::{
    event::events::Event,
    ui::{
        components::{text_input::TextField, track_list::TrackList},
        context::AppContext,
        state::AppState,
        traits::{Action, View},
    },
    util::{colors, task::TaskManager},
};

pub struct Search {
    input: TextField,
    is_editing: bool,
    results: TrackList,
    recent_state: ListState,
    tasks: TaskManager,
}

impl Default for Search {
    fn default() -> Self {
        let mut results = TrackList::new("Results");
        results.loading = false;
        let mut input = TextField::new("Search");
        input.placeholder = Some("Tracks, artists, genres".into());
        Self {
            input,
            is_editing: true,
            results,
            recent_state: ListState::default(),
            tasks: TaskManager::new(),
        }
    }
}

impl Search {
    fn query(&self) -> &str {
        self.input.trimmed()
    }

    /// Restarts the debounce timer. Only the last keystroke's timer survives
    /// long enough to fire a request.
    fn schedule_search(&mut self, ctx: &AppContext) {
        let query = self.query().to_string();
        if query.is_empty() {
            self.tasks.abort("debounce");
            self.results.set_tracks(Vec::new());
            return;
        }

        self.results.loading = true;
        let tx = ctx.event_tx.clone();
        let delay = ctx.config.search_debounce;
        self.tasks.spawn("debounce", async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Event::Search(query));
        });
    }

    fn search_now(&mut self, query: String, ctx: &AppContext) {
        self.tasks.abort("debounce");
        if query.is_empty() {
            return;
        }
        self.results.loading = true;
        let _ = ctx.event_tx.send(Event::Search(query));
    }

    fn render_recent(&mut self, f: &mut Frame, area: Rect, ctx: &AppContext) {
        let entries = ctx.recent_searches.entries();
        let items: Vec<ListItem> = entries
            .iter()
            .map(|q| ListItem::new(format!("  {q}")).style(Style::default().fg(colors::SECONDARY)))
            .collect();
        if self.recent_state.selected().is_none_or(|i| i >= entries.len()) {
            self.recent_state
                .select(if entries.is_empty() { None } else { Some(0) });
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(colors::NEUTRAL))
            .title(" Recent searches ")
            .title_bottom(Line::from(" c: clear ".fg(colors::NEUTRAL)));

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(colors::NEUTRAL).add_modifier(Modifier::BOLD));
        f.render_stateful_widget(list, area, &mut self.recent_state);
    }

    fn handle_recent_key(&mut self, key: KeyEvent, ctx: &AppContext) -> Option<Action> {
        let count = ctx.recent_searches.entries().len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down if count > 0 => {
                let next = self.recent_state.selected().map_or(0, |i| (i + 1).min(count - 1));
                self.recent_state.select(Some(next));
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let prev = self.recent_state.selected().map_or(0, |i| i.saturating_sub(1));
                self.recent_state.select(Some(prev));
            }
            KeyCode::Enter => {
                let query = self
                    .recent_state
                    .selected()
                    .and_then(|i| ctx.recent_searches.entries().get(i))?
                    .clone();
                self.input.value = query.clone();
                self.search_now(query, ctx);
            }
            KeyCode::Char('c') => {
                let _ = ctx.event_tx.send(Event::ClearRecentSearches);
            }
            _ => return None,
        }
        Some(Action::None)
    }
}

#[async_trait]
impl View for Search {
    async fn on_event(&mut self, event: &Event, _ctx: &AppContext) {
        match event {
            // Answers for an older query are dropped.
            Event::SearchResults(query, tracks) if query == self.query() => {
                self.results.set_tracks(tracks.clone());
            }
            Event::FetchError(_) => self.results.loading = false,
            _ => {}
        }
    }

    fn render(&mut self, f: &mut Frame, area: Rect, _state: &AppState, ctx: &AppContext) {
        let [input_area, results_area] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).areas(area);

        self.input.render(input_area, f.buffer_mut(), self.is_editing);

        if self.query().is_empty() && !ctx.recent_searches.entries().is_empty() {
            self.render_recent(f, results_area, ctx);
        } else {
            self.results.render(f, results_area, ctx, !self.is_editing);
        }
    }

    async fn handle_input(
        &mut self,
        key: KeyEvent,
        _state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action> {
        if self.is_editing {
            match key.code {
                KeyCode::Esc | KeyCode::Down | KeyCode::Tab => self.is_editing = false,
                KeyCode::Enter => {
                    self.is_editing = false;
                    let query = self.query().to_string();
                    self.search_now(query, ctx);
                }
                _ => {
                    if self.input.handle_key(key) {
                        self.schedule_search(ctx);
                    }
                }
            }
            return Some(Action::None);
        }

        match key.code {
            KeyCode::Char('/') | KeyCode::Char('i') => {
                self.is_editing = true;
                Some(Action::None)
            }
            _ if self.query().is_empty() => self.handle_recent_key(key, ctx),
            _ => self.results.handle_key(key, ctx),
        }
    }

    fn captures_input(&self) -> bool {
        self.is_editing
    }
}
