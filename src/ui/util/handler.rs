use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use tracing::{info, warn};

use crate::{
    event::events::Event,
    http::{error::ApiError, models::InteractionType, models::TrackId},
    ui::{
        app::App,
        input::InputHandler,
        state::Route,
        traits::Action,
        tui::{TerminalEvent, Tui},
        util::{error_event, fetch},
        views::view_for,
    },
};

pub struct EventHandler;

impl EventHandler {
    pub async fn handle_events(app: &mut App, tui: &mut Tui) -> color_eyre::Result<bool> {
        let mut should_render = false;
        if let Some(evt) = tui.next().await {
            if Self::handle_event(app, evt, tui).await? {
                should_render = true;
            }
        }

        while let Ok(evt) = app.event_rx.try_recv() {
            Self::handle_action(app, evt).await;
            should_render = true;
        }

        Ok(should_render)
    }

    pub async fn handle_event(
        app: &mut App,
        evt: TerminalEvent,
        tui: &mut Tui,
    ) -> color_eyre::Result<bool> {
        match evt {
            TerminalEvent::FocusGained => {
                app.has_focus = true;
                tui.clear()?;
            }
            TerminalEvent::FocusLost => app.has_focus = false,
            TerminalEvent::Key(key) => Self::handle_key_event(app, key).await,
            TerminalEvent::Mouse(mouse) => Self::handle_mouse_event(app, mouse),
            TerminalEvent::Paste(text) => Self::handle_paste(app, &text).await,
            TerminalEvent::Tick => return Ok(app.has_focus),
            TerminalEvent::Resize(..) => {}
        }

        Ok(true)
    }

    pub async fn handle_action(app: &mut App, evt: Event) {
        app.router.on_event(&evt, &app.ctx).await;

        match evt {
            Event::Media(media) => app.ctx.audio_system.on_media_event(media),

            // Playback commands
            Event::PlayTracks(tracks, index) => {
                if let Some(track) = tracks.get(index).cloned() {
                    app.ctx.audio_system.play(track, tracks);
                }
            }
            Event::PlayAll(tracks) => app.ctx.audio_system.set_queue(tracks, 0),
            Event::QueueTracks(tracks) => {
                let count = tracks.len();
                app.ctx.audio_system.add_to_queue(tracks);
                app.state.ui.status_message = Some(match count {
                    1 => "Added to queue".to_string(),
                    n => format!("Added {n} tracks to queue"),
                });
            }
            Event::ClearQueue => app.ctx.audio_system.clear_queue(),

            // Session
            Event::Login(credentials) => {
                let api = app.ctx.api.clone();
                let tx = app.ctx.event_tx.clone();
                app.task_manager.spawn("auth", async move {
                    let event = match api.login(&credentials).await {
                        Ok(response) => Event::LoggedIn(response),
                        Err(err) => Event::AuthFailed(auth_error_message(&err)),
                    };
                    let _ = tx.send(event);
                });
            }
            Event::Register(registration) => {
                let api = app.ctx.api.clone();
                let tx = app.ctx.event_tx.clone();
                app.task_manager.spawn("auth", async move {
                    let event = match api.register(&registration).await {
                        Ok(response) => Event::Registered(response),
                        Err(err) => Event::AuthFailed(auth_error_message(&err)),
                    };
                    let _ = tx.send(event);
                });
            }
            Event::LoggedIn(response) => {
                app.ctx.session.apply_login(&response);
                app.state.ui.status_message = Some(format!("Signed in as {}", response.username));
                Self::on_signed_in(app).await;
            }
            Event::Registered(response) => {
                app.ctx.session.apply_registration(&response);
                app.state.ui.status_message = Some("Welcome aboard".to_string());
                Self::on_signed_in(app).await;
            }
            Event::Logout => {
                let api = app.ctx.api.clone();
                let tx = app.ctx.event_tx.clone();
                app.task_manager.spawn("auth", async move {
                    if let Err(err) = api.logout().await {
                        warn!(error = %err, "Logout request failed");
                    }
                    let _ = tx.send(Event::LoggedOut);
                });
            }
            Event::LoggedOut => {
                Self::on_signed_out(app).await;
            }
            Event::Unauthorized => {
                if app.ctx.session.is_authenticated() {
                    info!("Server rejected the token, ending session");
                    Self::on_signed_out(app).await;
                    app.state.ui.error_message =
                        Some("Session expired, please sign in again".to_string());
                }
            }
            Event::ProfileFetched(user) => app.ctx.session.apply_profile(user),
            Event::ProfileUpdated(user) => {
                app.ctx.session.apply_profile(user);
                app.state.ui.status_message = Some("Profile saved".to_string());
            }
            Event::UpdateProfile(update) => {
                let api = app.ctx.api.clone();
                app.task_manager.spawn(
                    "profile_update",
                    fetch(
                        app.ctx.event_tx.clone(),
                        "Saving profile",
                        async move { api.update_profile(&update).await },
                        Event::ProfileUpdated,
                    ),
                );
            }
            Event::LikedTracksFetched(tracks) => app.ctx.session.set_liked_tracks(&tracks),

            // Likes and interactions
            Event::ToggleLike(track_id) => {
                let api = app.ctx.api.clone();
                let tx = app.ctx.event_tx.clone();
                tokio::spawn(fetch(
                    tx,
                    "Liking track",
                    async move { api.like_track(track_id).await },
                    move |liked| Event::LikeToggled(track_id, liked),
                ));
            }
            Event::LikeToggled(track_id, liked) => {
                app.ctx.session.apply_like_toggled(track_id, liked);
                if liked {
                    Self::mark_interaction(app, track_id, InteractionType::Like);
                }
            }
            Event::Follow(user_id, name, follow) => {
                let api = app.ctx.api.clone();
                tokio::spawn(fetch(
                    app.ctx.event_tx.clone(),
                    if follow { "Following artist" } else { "Unfollowing artist" },
                    async move {
                        if follow {
                            api.follow_user(user_id).await
                        } else {
                            api.unfollow_user(user_id).await
                        }
                    },
                    move |_| Event::Notice(follow_notice(&name, follow)),
                ));
            }

            // Search
            Event::Search(query) => {
                app.ctx.recent_searches.record(&query);
                let api = app.ctx.api.clone();
                let q = query.clone();
                app.task_manager.spawn(
                    "search",
                    fetch(
                        app.ctx.event_tx.clone(),
                        "Searching",
                        async move { api.search_tracks(&q).await },
                        move |tracks| Event::SearchResults(query, tracks),
                    ),
                );
            }
            Event::ClearRecentSearches => app.ctx.recent_searches.clear(),

            // Upload
            Event::Upload(request) => {
                let api = app.ctx.api.clone();
                let tx = app.ctx.event_tx.clone();
                app.task_manager.spawn("upload", async move {
                    let progress_tx = tx.clone();
                    let result = api
                        .upload_track(&request, move |percent| {
                            let _ = progress_tx.send(Event::UploadProgress(percent));
                        })
                        .await;
                    let event = match result {
                        Ok(response) => Event::UploadFinished(response),
                        Err(err) => {
                            warn!(error = %err, "Upload failed");
                            if err.is_unauthorized() {
                                let _ = tx.send(Event::Unauthorized);
                            }
                            Event::UploadFailed(err.to_string())
                        }
                    };
                    let _ = tx.send(event);
                });
            }
            Event::UploadFinished(track) => {
                info!(id = track.id, title = %track.title, "Upload finished");
                app.state.ui.status_message = Some(format!("Uploaded \"{}\"", track.title));
            }

            // Playlists
            Event::CreatePlaylist(playlist) => {
                let api = app.ctx.api.clone();
                app.task_manager.spawn(
                    "playlist_create",
                    fetch(
                        app.ctx.event_tx.clone(),
                        "Creating playlist",
                        async move { api.create_playlist(&playlist).await },
                        Event::PlaylistCreated,
                    ),
                );
            }
            Event::PlaylistCreated(playlist) => {
                app.state.ui.status_message = Some(format!("Created \"{}\"", playlist.title));
            }
            Event::AddToPlaylist(playlist_id, track_id) => {
                let api = app.ctx.api.clone();
                tokio::spawn(fetch(
                    app.ctx.event_tx.clone(),
                    "Adding to playlist",
                    async move { api.add_track_to_playlist(playlist_id, track_id).await },
                    |_| Event::PlaylistChanged,
                ));
                Self::mark_interaction(app, track_id, InteractionType::AddToPlaylist);
            }
            Event::RemoveFromPlaylist(playlist_id, track_id) => {
                let api = app.ctx.api.clone();
                tokio::spawn(fetch(
                    app.ctx.event_tx.clone(),
                    "Removing from playlist",
                    async move { api.remove_track_from_playlist(playlist_id, track_id).await },
                    |_| Event::PlaylistChanged,
                ));
            }
            Event::PlaylistChanged => {
                app.state.ui.status_message = Some("Playlist updated".to_string());
            }

            // Recommendations
            Event::LoadGenre(genre_id) => {
                let api = app.ctx.api.clone();
                app.task_manager.spawn(
                    "genre",
                    fetch(
                        app.ctx.event_tx.clone(),
                        "Loading genre",
                        async move { api.fetch_by_genre(genre_id).await },
                        move |tracks| Event::GenreTracksFetched(genre_id, tracks),
                    ),
                );
            }
            Event::RefreshRecommendations => {
                let api = app.ctx.api.clone();
                app.state.ui.status_message = Some("Refreshing recommendations".to_string());
                app.task_manager.spawn(
                    "refresh",
                    fetch(
                        app.ctx.event_tx.clone(),
                        "Refreshing recommendations",
                        async move { api.refresh_recommendations().await },
                        Event::RecommendationsRefreshed,
                    ),
                );
            }
            Event::RecommendationsRefreshed(detail) => {
                app.state.ui.status_message = Some(detail);
            }

            Event::FetchError(message) => app.state.ui.error_message = Some(message),
            Event::Notice(message) => app.state.ui.status_message = Some(message),
            _ => {}
        }
    }

    /// Replaces the whole view stack with the page for `route`.
    pub async fn navigate(app: &mut App, route: Route) {
        app.state.ui.current_route = route;
        if let Some(index) = route.index() {
            app.state.ui.sidebar_index = index;
        }
        app.router.reset(view_for(route));
        app.router.mount_active(&app.ctx).await;
    }

    async fn on_signed_in(app: &mut App) {
        Self::refresh_session_data(app);
        Self::navigate(app, Route::Home).await;
    }

    async fn on_signed_out(app: &mut App) {
        app.ctx.session.clear();
        app.ctx.audio_system.pause();
        app.task_manager.abort_all();
        Self::navigate(app, Route::Auth).await;
    }

    /// Profile and liked set are refreshed in the background after sign-in
    /// or a restored session.
    pub fn refresh_session_data(app: &mut App) {
        let api = app.ctx.api.clone();
        app.task_manager.spawn(
            "session_profile",
            fetch(
                app.ctx.event_tx.clone(),
                "Loading profile",
                async move { api.fetch_current_user().await },
                Event::ProfileFetched,
            ),
        );

        let api = app.ctx.api.clone();
        app.task_manager.spawn(
            "session_liked",
            fetch(
                app.ctx.event_tx.clone(),
                "Loading liked tracks",
                async move { api.fetch_liked_tracks().await },
                Event::LikedTracksFetched,
            ),
        );
    }

    fn mark_interaction(app: &App, track_id: TrackId, kind: InteractionType) {
        let api = app.ctx.api.clone();
        let tx = app.ctx.event_tx.clone();
        tokio::spawn(async move {
            if let Err(err) = api.mark_interaction(track_id, kind).await {
                if err.is_unauthorized() {
                    let _ = tx.send(error_event("Recording interaction", err));
                } else {
                    warn!(track_id, error = %err, "Failed to record interaction");
                }
            }
        });
    }

    async fn handle_key_event(app: &mut App, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            app.should_quit = true;
            return;
        }

        app.state.ui.error_message = None;
        app.state.ui.status_message = None;

        if app.router.captures_input() {
            let _ = app.router.handle_input(key, &app.state, &app.ctx).await;
            return;
        }

        let on_auth = app.state.ui.current_route == Route::Auth;
        match key.code {
            KeyCode::Tab if !on_auth => {
                let next = (app.state.ui.sidebar_index + 1) % Route::SIDEBAR.len();
                Self::dispatch_action(app, Action::SwitchTab(next)).await;
                return;
            }
            KeyCode::BackTab if !on_auth => {
                let len = Route::SIDEBAR.len();
                let prev = (app.state.ui.sidebar_index + len - 1) % len;
                Self::dispatch_action(app, Action::SwitchTab(prev)).await;
                return;
            }
            _ => {}
        }

        if let Some(action) = app.router.handle_input(key, &app.state, &app.ctx).await {
            Self::dispatch_action(app, action).await;
            return;
        }

        if let Some(action) = InputHandler::handle_key(key) {
            Self::dispatch_action(app, action).await;
        }
    }

    async fn dispatch_action(app: &mut App, action: Action) {
        let audio = &mut app.ctx.audio_system;
        match action {
            Action::Quit => app.should_quit = true,
            Action::PlayPause => audio.play_pause(),
            Action::NextTrack => {
                let skipped = audio.current_track().map(|t| t.id);
                audio.play_next();
                if let Some(track_id) = skipped {
                    Self::mark_interaction(app, track_id, InteractionType::Skip);
                }
            }
            Action::PreviousTrack => audio.play_previous(),
            Action::VolumeUp => audio.volume_up(),
            Action::VolumeDown => audio.volume_down(),
            Action::ToggleMute => audio.toggle_mute(),
            Action::SeekForward => audio.seek_forwards(),
            Action::SeekBackward => audio.seek_backwards(),
            Action::ToggleRepeat => audio.toggle_repeat(),
            Action::ToggleShuffle => audio.toggle_shuffle(),
            Action::ToggleLikeCurrent => {
                if let Some(track_id) = audio.current_track().map(|t| t.id) {
                    let _ = app.ctx.event_tx.send(Event::ToggleLike(track_id));
                }
            }
            Action::TogglePlayerMinimized => {
                app.state.ui.player_minimized = !app.state.ui.player_minimized;
            }
            Action::TogglePlayerHidden => {
                app.state.ui.player_hidden = !app.state.ui.player_hidden;
            }
            Action::SwitchTab(index) => {
                if app.state.ui.current_route == Route::Auth {
                    return;
                }
                if let Some(route) = Route::from_index(index) {
                    if route != app.state.ui.current_route {
                        Self::navigate(app, route).await;
                    }
                }
            }
            Action::Back => app.router.pop(),
            Action::None => {}
        }
    }

    fn handle_mouse_event(app: &mut App, evt: MouseEvent) {
        let audio = &mut app.ctx.audio_system;
        match (evt.kind, evt.modifiers) {
            (MouseEventKind::Down(MouseButton::Left), _) => {
                let Some(area) = app.state.ui.progress_area else {
                    return;
                };
                let inside = evt.column >= area.x
                    && evt.column < area.x + area.width
                    && evt.row >= area.y
                    && evt.row < area.y + area.height;
                if inside && area.width > 0 {
                    let fraction = f64::from(evt.column - area.x) / f64::from(area.width);
                    audio.seek_fraction(fraction);
                }
            }
            (MouseEventKind::ScrollUp, KeyModifiers::SHIFT) => audio.seek_forwards(),
            (MouseEventKind::ScrollUp, _) => audio.volume_up(),
            (MouseEventKind::ScrollDown, KeyModifiers::SHIFT) => audio.seek_backwards(),
            (MouseEventKind::ScrollDown, _) => audio.volume_down(),
            _ => {}
        }
    }

    /// Pasted text is typed into the focused field, if a view is editing.
    async fn handle_paste(app: &mut App, text: &str) {
        if !app.router.captures_input() {
            return;
        }
        for c in text.chars().filter(|c| !c.is_control()) {
            let key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
            let _ = app.router.handle_input(key, &app.state, &app.ctx).await;
        }
    }
}

fn follow_notice(name: &str, follow: bool) -> String {
    if follow {
        format!("Following {name}")
    } else {
        format!("Unfollowed {name}")
    }
}

fn auth_error_message(err: &ApiError) -> String {
    match err {
        ApiError::Unauthorized => "Invalid username or password".to_string(),
        ApiError::Server { message, .. } if !message.is_empty() => message.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_prefer_the_server_message() {
        let err = ApiError::Server {
            status: 400,
            message: "A user with that username already exists.".into(),
        };
        assert_eq!(
            auth_error_message(&err),
            "A user with that username already exists."
        );
        assert_eq!(
            auth_error_message(&ApiError::Unauthorized),
            "Invalid username or password"
        );
    }

    #[test]
    fn follow_notice_names_the_artist() {
        assert_eq!(follow_notice("Nadia", true), "Following Nadia");
        assert_eq!(follow_notice("Nadia", false), "Unfollowed Nadia");
    }
}
