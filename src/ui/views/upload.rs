use std::path::PathBuf;

use async_trait::async_trait;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Style, Stylize},
    text::Line,
    widgets::{Gauge, Paragraph},
};

use crate::{
    event::events::Event,
    http::{models::Genre, upload::UploadRequest},
    ui::{
        components::text_input::{Form, TextField},
        context::AppContext,
        state::AppState,
        traits::{Action, View},
        util::fetch,
    },
    util::{colors, task::TaskManager},
};

const AUDIO: usize = 0;
const COVER: usize = 1;
const TITLE: usize = 2;

enum Outcome {
    Uploaded(String),
    Failed(String),
}

pub struct Upload {
    form: Form,
    genres: Vec<Genre>,
    genre: Option<usize>,
    is_editing: bool,
    uploading: bool,
    progress: u8,
    outcome: Option<Outcome>,
    tasks: TaskManager,
}

fn upload_form() -> Form {
    let mut audio = TextField::keyed("audio_file", "Audio file");
    audio.placeholder = Some("~/music/song.mp3".into());
    let mut cover = TextField::keyed("cover_image", "Cover image (optional)");
    cover.placeholder = Some("~/music/cover.jpg".into());
    Form::new(vec![
        audio,
        cover,
        TextField::keyed("title", "Title"),
        TextField::keyed("description", "Description"),
        TextField::keyed("tags", "Tags"),
    ])
}

impl Default for Upload {
    fn default() -> Self {
        Self {
            form: upload_form(),
            genres: Vec::new(),
            genre: None,
            is_editing: true,
            uploading: false,
            progress: 0,
            outcome: None,
            tasks: TaskManager::new(),
        }
    }
}

/// Expands a leading `~` to the home directory.
fn expand_path(raw: &str) -> Option<PathBuf> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(dirs) = directories::BaseDirs::new() {
            return Some(dirs.home_dir().join(rest));
        }
    }
    Some(PathBuf::from(raw))
}

impl Upload {
    fn request(&self) -> UploadRequest {
        UploadRequest {
            audio_path: expand_path(self.form.raw_value(AUDIO)),
            cover_path: expand_path(self.form.raw_value(COVER)),
            title: self.form.value(TITLE).to_string(),
            genre: self
                .genre
                .and_then(|i| self.genres.get(i))
                .map(|g| g.id.to_string()),
            description: self.form.value(3).to_string(),
            tags: self.form.value(4).to_string(),
        }
    }

    fn cycle_genre(&mut self) {
        self.genre = match self.genre {
            _ if self.genres.is_empty() => None,
            None => Some(0),
            Some(i) if i + 1 < self.genres.len() => Some(i + 1),
            Some(_) => None,
        };
    }

    fn submit(&mut self, ctx: &AppContext) {
        if self.uploading {
            return;
        }
        self.form.clear_errors();
        let request = self.request();
        if let Err(err) = request.validate() {
            self.form.set_field_error(err.field(), err.to_string());
            self.is_editing = true;
            return;
        }
        self.uploading = true;
        self.progress = 0;
        self.outcome = None;
        let _ = ctx.event_tx.send(Event::Upload(request));
    }

    fn refresh_title_hint(&mut self) {
        let hint = self.request().effective_title();
        if let Some(title) = self.form.fields.get_mut(TITLE) {
            title.placeholder = (!hint.is_empty()).then_some(hint);
        }
    }
}

#[async_trait]
impl View for Upload {
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
    }

    async fn on_event(&mut self, event: &Event, _ctx: &AppContext) {
        match event {
            Event::GenresFetched(genres) => self.genres = genres.clone(),
            Event::UploadProgress(percent) if self.uploading => self.progress = *percent,
            Event::UploadFinished(track) => {
                self.uploading = false;
                self.progress = 100;
                self.outcome = Some(Outcome::Uploaded(track.title.clone()));
                self.form = upload_form();
                self.genre = None;
            }
            Event::UploadFailed(message) => {
                self.uploading = false;
                self.outcome = Some(Outcome::Failed(message.clone()));
            }
            _ => {}
        }
    }

    fn render(&mut self, f: &mut Frame, area: Rect, _state: &AppState, _ctx: &AppContext) {
        let [form_area, genre_area, status_area, help_area] = Layout::vertical([
            Constraint::Length(self.form.height()),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        self.form.render(form_area, f.buffer_mut(), self.is_editing);

        let genre = self
            .genre
            .and_then(|i| self.genres.get(i))
            .map(|g| g.name.clone())
            .unwrap_or_else(|| "none".to_string());
        f.render_widget(
            Paragraph::new(Line::from(vec![
                " Genre: ".fg(colors::SECONDARY),
                genre.fg(colors::PRIMARY),
                "  (ctrl-g to change)".fg(colors::NEUTRAL),
            ])),
            genre_area,
        );

        if self.uploading {
            f.render_widget(
                Gauge::default()
                    .gauge_style(Style::default().fg(colors::PRIMARY).bg(colors::NEUTRAL))
                    .percent(u16::from(self.progress.min(100)))
                    .label(format!("Uploading {}%", self.progress)),
                status_area,
            );
        } else if let Some(outcome) = &self.outcome {
            let line = match outcome {
                Outcome::Uploaded(title) => format!(" Uploaded \"{title}\"").fg(colors::SUCCESS),
                Outcome::Failed(message) => format!(" Upload failed: {message}").fg(colors::ACCENT),
            };
            f.render_widget(Paragraph::new(line), status_area);
        }

        let help = if self.is_editing {
            " tab: next field  ctrl-s: upload  esc: done editing "
        } else {
            " i: edit  enter: upload "
        };
        f.render_widget(Paragraph::new(help.fg(colors::NEUTRAL)), help_area);
    }

    async fn handle_input(
        &mut self,
        key: KeyEvent,
        _state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('s') if ctrl => self.submit(ctx),
            KeyCode::Char('g') if ctrl => self.cycle_genre(),
            KeyCode::Esc if self.is_editing => self.is_editing = false,
            KeyCode::Enter if self.is_editing => {
                if self.form.focus + 1 == self.form.fields.len() {
                    self.submit(ctx);
                } else {
                    self.form.focus_next();
                }
            }
            _ if self.is_editing => {
                if self.form.handle_key(key) {
                    self.refresh_title_hint();
                }
            }
            KeyCode::Char('i') => self.is_editing = true,
            KeyCode::Enter => self.submit(ctx),
            _ => return None,
        }
        Some(Action::None)
    }

    fn captures_input(&self) -> bool {
        self.is_editing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_paths_are_absent() {
        assert_eq!(expand_path("  "), None);
        assert_eq!(expand_path("/tmp/a.mp3"), Some(PathBuf::from("/tmp/a.mp3")));
    }

    #[test]
    fn genre_selection_cycles_back_to_none() {
        let mut upload = Upload::default();
        upload.cycle_genre();
        assert_eq!(upload.genre, None);

        upload.genres = vec![
            Genre { id: 1, name: "Rock".into(), description: None },
            Genre { id: 2, name: "Jazz".into(), description: None },
        ];
        upload.cycle_genre();
        assert_eq!(upload.genre, Some(0));
        upload.cycle_genre();
        assert_eq!(upload.genre, Some(1));
        assert_eq!(upload.request().genre.as_deref(), Some("2"));
        upload.cycle_genre();
        assert_eq!(upload.genre, None);
    }

    #[test]
    fn title_hint_follows_the_audio_file_name() {
        let mut upload = Upload::default();
        upload.form.fields[AUDIO].value = "/music/night drive.mp3".into();
        upload.refresh_title_hint();
        assert_eq!(
            upload.form.fields[TITLE].placeholder.as_deref(),
            Some("night drive")
        );
    }
}
