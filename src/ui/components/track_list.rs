use ratatui::{
    Frame,
    crossterm::event::{KeyCode, KeyEvent},
    layout::{Constraint, Rect},
    style::{Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, BorderType, Borders, Paragraph, Row, Table, TableState},
};

use crate::{
    event::events::Event,
    http::models::Track,
    ui::{components::spinner::Spinner, context::AppContext, traits::Action, util::get_active_track_icon},
    util::{colors, format::format_duration},
};

/// A selectable list of tracks. Enter plays the list from the selection,
/// `a` queues the selected track, `A` plays everything, `f` toggles like.
/// `u` and `U` follow and unfollow the selected track's artist.
pub struct TrackList {
    pub title: String,
    pub tracks: Vec<Track>,
    pub state: TableState,
    pub loading: bool,
}

impl TrackList {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            tracks: Vec::new(),
            state: TableState::default(),
            loading: true,
        }
    }

    pub fn set_tracks(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
        self.loading = false;
        let selected = match self.state.selected() {
            _ if self.tracks.is_empty() => None,
            Some(i) => Some(i.min(self.tracks.len() - 1)),
            None => Some(0),
        };
        self.state.select(selected);
    }

    pub fn selected(&self) -> Option<&Track> {
        self.state.selected().and_then(|i| self.tracks.get(i))
    }

    pub fn select_next(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        let next = self.state.selected().map_or(0, |i| (i + 1).min(self.tracks.len() - 1));
        self.state.select(Some(next));
    }

    pub fn select_previous(&mut self) {
        let prev = self.state.selected().map_or(0, |i| i.saturating_sub(1));
        if !self.tracks.is_empty() {
            self.state.select(Some(prev));
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, ctx: &AppContext) -> Option<Action> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_previous(),
            KeyCode::Char('g') | KeyCode::Home => {
                if !self.tracks.is_empty() {
                    self.state.select(Some(0));
                }
            }
            KeyCode::Char('G') | KeyCode::End => {
                if !self.tracks.is_empty() {
                    self.state.select(Some(self.tracks.len() - 1));
                }
            }
            KeyCode::Enter => {
                let index = self.state.selected()?;
                let _ = ctx
                    .event_tx
                    .send(Event::PlayTracks(self.tracks.clone(), index));
            }
            KeyCode::Char('A') if !self.tracks.is_empty() => {
                let _ = ctx.event_tx.send(Event::PlayAll(self.tracks.clone()));
            }
            KeyCode::Char('a') => {
                let track = self.selected()?.clone();
                let _ = ctx.event_tx.send(Event::QueueTracks(vec![track]));
            }
            KeyCode::Char('f') => {
                let id = self.selected()?.id;
                let _ = ctx.event_tx.send(Event::ToggleLike(id));
            }
            KeyCode::Char(c @ ('u' | 'U')) => {
                let event = follow_event(self.selected()?, c == 'u')?;
                let _ = ctx.event_tx.send(event);
            }
            _ => return None,
        }
        Some(Action::None)
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, ctx: &AppContext, focused: bool) {
        let border = if focused { colors::SECONDARY } else { colors::NEUTRAL };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .title(format!(" {} ({}) ", self.title, self.tracks.len()));

        if self.loading {
            let inner = block.inner(area);
            f.render_widget(block, area);
            f.render_widget(
                Spinner::default()
                    .with_label("Loading")
                    .with_style(Style::default().fg(colors::SECONDARY)),
                inner,
            );
            return;
        }

        if self.tracks.is_empty() {
            f.render_widget(
                Paragraph::new(Line::from("Nothing here yet".fg(colors::NEUTRAL)))
                    .centered()
                    .block(block),
                area,
            );
            return;
        }

        let current_id = ctx.audio_system.current_track().map(|t| t.id);
        let is_playing = ctx.audio_system.is_playing();

        let rows: Vec<Row> = self
            .tracks
            .iter()
            .enumerate()
            .map(|(i, track)| {
                let is_current = current_id == Some(track.id);
                let marker = if is_current {
                    get_active_track_icon(is_playing).to_string()
                } else {
                    (i + 1).to_string()
                };
                let heart = if ctx.session.is_liked(track.id) { "♥" } else { "" };
                let duration = if track.duration > 0 {
                    format_duration(u64::from(track.duration))
                } else {
                    String::new()
                };
                let row = Row::new(vec![
                    marker,
                    track.title.clone(),
                    track.artist_name().to_string(),
                    heart.to_string(),
                    duration,
                ]);
                if is_current {
                    row.style(Style::default().fg(colors::PRIMARY))
                } else {
                    row.style(Style::default().fg(colors::SECONDARY))
                }
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(4),
                Constraint::Percentage(50),
                Constraint::Percentage(35),
                Constraint::Length(2),
                Constraint::Length(6),
            ],
        )
        .block(block)
        .row_highlight_style(
            Style::default()
                .bg(colors::NEUTRAL)
                .add_modifier(Modifier::BOLD),
        );

        f.render_stateful_widget(table, area, &mut self.state);
    }
}

fn follow_event(track: &Track, follow: bool) -> Option<Event> {
    let artist = track
        .artist
        .or_else(|| track.artist_detail.as_ref().map(|a| a.id))?;
    Some(Event::Follow(artist, track.artist_name().to_string(), follow))
}
