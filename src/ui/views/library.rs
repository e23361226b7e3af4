use async_trait::async_trait;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs},
};

use crate::{
    event::events::Event,
    http::models::{NewPlaylist, Playlist, TrackId},
    ui::{
        components::{
            text_input::{Form, TextField},
            track_list::TrackList,
        },
        context::AppContext,
        state::AppState,
        traits::{Action, View},
        util::fetch,
    },
    util::{colors, task::TaskManager},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LibraryTab {
    MyTracks,
    Liked,
    Playlists,
}

impl LibraryTab {
    const ALL: [LibraryTab; 3] = [LibraryTab::MyTracks, LibraryTab::Liked, LibraryTab::Playlists];

    fn title(self) -> &'static str {
        match self {
            LibraryTab::MyTracks => "My tracks",
            LibraryTab::Liked => "Liked",
            LibraryTab::Playlists => "Playlists",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn cycle(self, forward: bool) -> Self {
        let len = Self::ALL.len();
        let next = if forward {
            (self.index() + 1) % len
        } else {
            (self.index() + len - 1) % len
        };
        Self::ALL[next]
    }
}

/// Which playlists the Playlists tab lists: the user's own or every
/// playlist the server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaylistScope {
    Mine,
    All,
}

impl PlaylistScope {
    fn toggled(self) -> Self {
        match self {
            PlaylistScope::Mine => PlaylistScope::All,
            PlaylistScope::All => PlaylistScope::Mine,
        }
    }
}

/// Picks a playlist for `track_id`.
struct PlaylistPicker {
    track_id: TrackId,
    state: ListState,
}

struct CreatePlaylist {
    form: Form,
    is_public: bool,
}

struct OpenPlaylist {
    id: i64,
    scope: PlaylistScope,
    tracks: TrackList,
}

pub struct Library {
    tab: LibraryTab,
    my_tracks: TrackList,
    liked: TrackList,
    scope: PlaylistScope,
    playlists: Vec<Playlist>,
    all_playlists: Vec<Playlist>,
    playlists_loading: bool,
    all_playlists_loading: bool,
    playlist_state: ListState,
    open_playlist: Option<OpenPlaylist>,
    picker: Option<PlaylistPicker>,
    create: Option<CreatePlaylist>,
    tasks: TaskManager,
}

impl Default for Library {
    fn default() -> Self {
        Self {
            tab: LibraryTab::MyTracks,
            my_tracks: TrackList::new("My tracks"),
            liked: TrackList::new("Liked tracks"),
            scope: PlaylistScope::Mine,
            playlists: Vec::new(),
            all_playlists: Vec::new(),
            playlists_loading: true,
            all_playlists_loading: true,
            playlist_state: ListState::default(),
            open_playlist: None,
            picker: None,
            create: None,
            tasks: TaskManager::new(),
        }
    }
}

impl Library {
    fn fetch_my_tracks(&mut self, ctx: &AppContext) {
        let api = ctx.api.clone();
        self.tasks.spawn(
            "my_tracks",
            fetch(
                ctx.event_tx.clone(),
                "Loading your tracks",
                async move { api.fetch_my_tracks().await },
                Event::MyTracksFetched,
            ),
        );
    }

    fn fetch_liked(&mut self, ctx: &AppContext) {
        let api = ctx.api.clone();
        self.tasks.spawn(
            "liked",
            fetch(
                ctx.event_tx.clone(),
                "Loading liked tracks",
                async move { api.fetch_liked_tracks().await },
                Event::LikedTracksFetched,
            ),
        );
    }

    fn fetch_playlists(&mut self, ctx: &AppContext) {
        let api = ctx.api.clone();
        self.tasks.spawn(
            "playlists",
            fetch(
                ctx.event_tx.clone(),
                "Loading playlists",
                async move { api.fetch_my_playlists().await },
                Event::MyPlaylistsFetched,
            ),
        );
    }

    fn fetch_all_playlists(&mut self, ctx: &AppContext) {
        let api = ctx.api.clone();
        self.tasks.spawn(
            "all_playlists",
            fetch(
                ctx.event_tx.clone(),
                "Loading playlists",
                async move { api.fetch_playlists().await },
                Event::PlaylistsFetched,
            ),
        );
    }

    fn set_playlists(&mut self, scope: PlaylistScope, playlists: Vec<Playlist>) {
        match scope {
            PlaylistScope::Mine => {
                self.playlists_loading = false;
                self.playlists = playlists;
            }
            PlaylistScope::All => {
                self.all_playlists_loading = false;
                self.all_playlists = playlists;
            }
        }
        if scope == self.scope {
            self.clamp_selection();
        }

        if let Some(open) = self.open_playlist.as_mut().filter(|o| o.scope == scope) {
            let listing = match scope {
                PlaylistScope::Mine => &self.playlists,
                PlaylistScope::All => &self.all_playlists,
            };
            match listing.iter().find(|p| p.id == open.id) {
                Some(playlist) => open.tracks.set_tracks(playlist.tracks_detail.clone()),
                None => self.open_playlist = None,
            }
        }
    }

    fn shown(&self) -> &[Playlist] {
        match self.scope {
            PlaylistScope::Mine => &self.playlists,
            PlaylistScope::All => &self.all_playlists,
        }
    }

    fn shown_loading(&self) -> bool {
        match self.scope {
            PlaylistScope::Mine => self.playlists_loading,
            PlaylistScope::All => self.all_playlists_loading,
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.shown().len();
        let selected = match self.playlist_state.selected() {
            _ if len == 0 => None,
            Some(i) => Some(i.min(len - 1)),
            None => Some(0),
        };
        self.playlist_state.select(selected);
    }

    fn switch_scope(&mut self) {
        self.scope = self.scope.toggled();
        self.open_playlist = None;
        self.playlist_state.select(None);
        self.clamp_selection();
    }

    fn selected_playlist(&self) -> Option<&Playlist> {
        self.playlist_state.selected().and_then(|i| self.shown().get(i))
    }

    fn active_list(&mut self) -> Option<&mut TrackList> {
        match self.tab {
            LibraryTab::MyTracks => Some(&mut self.my_tracks),
            LibraryTab::Liked => Some(&mut self.liked),
            LibraryTab::Playlists => self.open_playlist.as_mut().map(|p| &mut p.tracks),
        }
    }

    fn open_picker(&mut self, ctx: &AppContext) {
        let Some(track_id) = self.active_list().and_then(|l| l.selected()).map(|t| t.id) else {
            return;
        };
        if self.playlists.is_empty() {
            let _ = ctx
                .event_tx
                .send(Event::Notice("Create a playlist first".into()));
            return;
        }
        let mut state = ListState::default();
        state.select(Some(0));
        self.picker = Some(PlaylistPicker { track_id, state });
    }

    fn handle_picker_key(&mut self, key: KeyEvent, ctx: &AppContext) {
        let Some(picker) = &mut self.picker else {
            return;
        };
        let count = self.playlists.len();
        match key.code {
            KeyCode::Esc => self.picker = None,
            KeyCode::Char('j') | KeyCode::Down if count > 0 => {
                let next = picker.state.selected().map_or(0, |i| (i + 1).min(count - 1));
                picker.state.select(Some(next));
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let prev = picker.state.selected().map_or(0, |i| i.saturating_sub(1));
                picker.state.select(Some(prev));
            }
            KeyCode::Enter => {
                if let Some(playlist) = picker.state.selected().and_then(|i| self.playlists.get(i)) {
                    let _ = ctx
                        .event_tx
                        .send(Event::AddToPlaylist(playlist.id, picker.track_id));
                }
                self.picker = None;
            }
            _ => {}
        }
    }

    fn handle_create_key(&mut self, key: KeyEvent, ctx: &AppContext) {
        let Some(create) = &mut self.create else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.create = None,
            KeyCode::Char('p') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                create.is_public = !create.is_public;
            }
            KeyCode::Enter => {
                let title = create.form.value(0).to_string();
                if title.is_empty() {
                    create.form.set_error(0, "title is required");
                    return;
                }
                let playlist = NewPlaylist {
                    title,
                    description: create.form.value(1).to_string(),
                    is_public: create.is_public,
                };
                let _ = ctx.event_tx.send(Event::CreatePlaylist(playlist));
                self.create = None;
            }
            _ => {
                create.form.handle_key(key);
            }
        }
    }

    fn handle_playlists_key(&mut self, key: KeyEvent, ctx: &AppContext) -> Option<Action> {
        if let Some(open) = &mut self.open_playlist {
            return match key.code {
                KeyCode::Esc | KeyCode::Backspace => {
                    self.open_playlist = None;
                    Some(Action::None)
                }
                KeyCode::Char('d') if open.scope == PlaylistScope::Mine => {
                    let track_id = open.tracks.selected()?.id;
                    let _ = ctx
                        .event_tx
                        .send(Event::RemoveFromPlaylist(open.id, track_id));
                    Some(Action::None)
                }
                _ => open.tracks.handle_key(key, ctx),
            };
        }

        let count = self.shown().len();
        match key.code {
            KeyCode::Char('v') => self.switch_scope(),
            KeyCode::Char('j') | KeyCode::Down if count > 0 => {
                let next = self
                    .playlist_state
                    .selected()
                    .map_or(0, |i| (i + 1).min(count - 1));
                self.playlist_state.select(Some(next));
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let prev = self.playlist_state.selected().map_or(0, |i| i.saturating_sub(1));
                self.playlist_state.select(Some(prev));
            }
            KeyCode::Enter => {
                let playlist = self.selected_playlist()?;
                let mut tracks = TrackList::new(playlist.title.clone());
                tracks.set_tracks(playlist.tracks_detail.clone());
                self.open_playlist = Some(OpenPlaylist {
                    id: playlist.id,
                    scope: self.scope,
                    tracks,
                });
            }
            KeyCode::Char('c') => {
                self.create = Some(CreatePlaylist {
                    form: Form::new(vec![
                        TextField::new("Title"),
                        TextField::new("Description"),
                    ]),
                    is_public: false,
                });
            }
            _ => return None,
        }
        Some(Action::None)
    }

    fn render_playlists(&mut self, f: &mut Frame, area: Rect, ctx: &AppContext) {
        if let Some(open) = &mut self.open_playlist {
            open.tracks.render(f, area, ctx, true);
            return;
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(colors::SECONDARY));
        let title = match self.scope {
            PlaylistScope::Mine => "My playlists",
            PlaylistScope::All => "All playlists",
        };
        let block = block
            .title(format!(" {title} ({}) ", self.shown().len()))
            .title_bottom(Line::from(" enter: open  c: new  v: mine/all ".fg(colors::NEUTRAL)));

        if self.shown_loading() && self.shown().is_empty() {
            f.render_widget(Paragraph::new("Loading").centered().block(block), area);
            return;
        }

        let items: Vec<ListItem> = self
            .shown()
            .iter()
            .map(|p| {
                let visibility = if p.is_public { "public" } else { "private" };
                ListItem::new(Line::from(vec![
                    format!("  {}", p.title).fg(colors::PRIMARY),
                    format!("  {} tracks, {visibility}", p.track_count).fg(colors::NEUTRAL),
                ]))
            })
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(colors::NEUTRAL).add_modifier(Modifier::BOLD));
        f.render_stateful_widget(list, area, &mut self.playlist_state);
    }

    fn render_picker(&mut self, f: &mut Frame, area: Rect) {
        let Some(picker) = &mut self.picker else {
            return;
        };
        let popup = centered(area, 40, (self.playlists.len() as u16 + 2).min(area.height));
        let items: Vec<ListItem> = self
            .playlists
            .iter()
            .map(|p| ListItem::new(format!("  {}", p.title)))
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title(" Add to playlist "),
            )
            .highlight_style(Style::default().bg(colors::NEUTRAL).add_modifier(Modifier::BOLD));
        f.render_widget(Clear, popup);
        f.render_stateful_widget(list, popup, &mut picker.state);
    }

    fn render_create(&self, f: &mut Frame, area: Rect) {
        let Some(create) = &self.create else {
            return;
        };
        let popup = centered(area, 50, create.form.height() + 3);
        let visibility = if create.is_public { "public" } else { "private" };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(" New playlist ")
            .title_bottom(Line::from(
                format!(" {visibility} (ctrl-p)  enter: create ").fg(colors::NEUTRAL),
            ));
        let inner = block.inner(popup);
        f.render_widget(Clear, popup);
        f.render_widget(block, popup);
        create.form.render(inner, f.buffer_mut(), true);
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    popup
}

#[async_trait]
impl View for Library {
    async fn on_mount(&mut self, ctx: &AppContext) {
        self.fetch_my_tracks(ctx);
        self.fetch_liked(ctx);
        self.fetch_playlists(ctx);
        self.fetch_all_playlists(ctx);
    }

    async fn on_event(&mut self, event: &Event, ctx: &AppContext) {
        match event {
            Event::MyTracksFetched(tracks) => self.my_tracks.set_tracks(tracks.clone()),
            Event::LikedTracksFetched(tracks) => self.liked.set_tracks(tracks.clone()),
            Event::MyPlaylistsFetched(playlists) => {
                self.set_playlists(PlaylistScope::Mine, playlists.clone())
            }
            Event::PlaylistsFetched(playlists) => {
                self.set_playlists(PlaylistScope::All, playlists.clone())
            }
            Event::PlaylistCreated(_) | Event::PlaylistChanged => {
                self.fetch_playlists(ctx);
                self.fetch_all_playlists(ctx);
            }
            Event::LikeToggled(..) => self.fetch_liked(ctx),
            Event::UploadFinished(_) => self.fetch_my_tracks(ctx),
            Event::FetchError(_) => {
                self.my_tracks.loading = false;
                self.liked.loading = false;
                self.playlists_loading = false;
                self.all_playlists_loading = false;
            }
            _ => {}
        }
    }

    fn render(&mut self, f: &mut Frame, area: Rect, _state: &AppState, ctx: &AppContext) {
        let [tabs_area, body] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).areas(area);

        let tabs = Tabs::new(LibraryTab::ALL.iter().map(|t| t.title()))
            .select(self.tab.index())
            .style(Style::default().fg(colors::SECONDARY))
            .highlight_style(Style::default().fg(colors::PRIMARY).add_modifier(Modifier::BOLD));
        f.render_widget(tabs, tabs_area);

        match self.tab {
            LibraryTab::MyTracks => self.my_tracks.render(f, body, ctx, true),
            LibraryTab::Liked => self.liked.render(f, body, ctx, true),
            LibraryTab::Playlists => self.render_playlists(f, body, ctx),
        }

        self.render_picker(f, body);
        self.render_create(f, body);
    }

    async fn handle_input(
        &mut self,
        key: KeyEvent,
        _state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action> {
        if self.create.is_some() {
            self.handle_create_key(key, ctx);
            return Some(Action::None);
        }
        if self.picker.is_some() {
            self.handle_picker_key(key, ctx);
            return Some(Action::None);
        }

        match key.code {
            KeyCode::Left | KeyCode::Char('h') => {
                self.tab = self.tab.cycle(false);
                Some(Action::None)
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.tab = self.tab.cycle(true);
                Some(Action::None)
            }
            KeyCode::Char('P') => {
                self.open_picker(ctx);
                Some(Action::None)
            }
            _ if self.tab == LibraryTab::Playlists => self.handle_playlists_key(key, ctx),
            _ => self.active_list()?.handle_key(key, ctx),
        }
    }

    fn captures_input(&self) -> bool {
        self.create.is_some() || self.picker.is_some()
    }
}
