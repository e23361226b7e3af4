use async_trait::async_trait;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::Stylize,
    text::Line,
    widgets::Paragraph,
};

use crate::{
    event::events::Event,
    http::models::{Credentials, Registration},
    ui::{
        components::{
            spinner::spinner_symbol,
            text_input::{Form, TextField},
        },
        context::AppContext,
        state::AppState,
        traits::{Action, View},
    },
    util::colors,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Login,
    Register,
}

/// Login and registration. The only screen shown without a session.
pub struct Auth {
    mode: Mode,
    login: Form,
    register: Form,
    submitting: bool,
    message: Option<String>,
}

impl Default for Auth {
    fn default() -> Self {
        Self {
            mode: Mode::Login,
            login: Form::new(vec![
                TextField::keyed("username", "Username"),
                TextField::keyed("password", "Password").masked(),
            ]),
            register: Form::new(vec![
                TextField::keyed("username", "Username"),
                TextField::keyed("email", "Email"),
                TextField::keyed("password", "Password").masked(),
                TextField::keyed("password_confirm", "Confirm password").masked(),
                TextField::keyed("first_name", "First name"),
                TextField::keyed("last_name", "Last name"),
            ]),
            submitting: false,
            message: None,
        }
    }
}

impl Auth {
    fn form(&self) -> &Form {
        match self.mode {
            Mode::Login => &self.login,
            Mode::Register => &self.register,
        }
    }

    fn form_mut(&mut self) -> &mut Form {
        match self.mode {
            Mode::Login => &mut self.login,
            Mode::Register => &mut self.register,
        }
    }

    /// Validates locally and, if the form is complete, hands it to the
    /// event loop. Returns the event to send.
    fn submission(&mut self) -> Option<Event> {
        self.form_mut().clear_errors();
        self.message = None;

        let result = match self.mode {
            Mode::Login => {
                let credentials = Credentials {
                    username: self.login.value(0).to_string(),
                    password: self.login.raw_value(1).to_string(),
                };
                credentials.validate().map(|_| Event::Login(credentials))
            }
            Mode::Register => {
                let registration = Registration {
                    username: self.register.value(0).to_string(),
                    email: self.register.value(1).to_string(),
                    password: self.register.raw_value(2).to_string(),
                    password_confirm: self.register.raw_value(3).to_string(),
                    first_name: self.register.value(4).to_string(),
                    last_name: self.register.value(5).to_string(),
                };
                registration.validate().map(|_| Event::Register(registration))
            }
        };

        match result {
            Ok(event) => {
                self.submitting = true;
                Some(event)
            }
            Err(err) => {
                self.form_mut().set_field_error(err.field(), err.to_string());
                None
            }
        }
    }

    fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            Mode::Login => Mode::Register,
            Mode::Register => Mode::Login,
        };
        self.message = None;
    }
}

#[async_trait]
impl View for Auth {
    async fn on_event(&mut self, event: &Event, _ctx: &AppContext) {
        if let Event::AuthFailed(message) = event {
            self.submitting = false;
            self.message = Some(message.clone());
        }
    }

    fn render(&mut self, f: &mut Frame, area: Rect, _state: &AppState, _ctx: &AppContext) {
        let form = self.form();
        let [column] = Layout::horizontal([Constraint::Length(48u16.min(area.width))])
            .flex(Flex::Center)
            .areas(area);
        let [title_area, form_area, status_area, help_area] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(form.height()),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .flex(Flex::Center)
        .areas(column);

        let title = match self.mode {
            Mode::Login => "Sign in",
            Mode::Register => "Create an account",
        };
        f.render_widget(
            Paragraph::new(Line::from(title.fg(colors::PRIMARY).bold())).centered(),
            title_area,
        );

        form.render(form_area, f.buffer_mut(), !self.submitting);

        let status = if self.submitting {
            Line::from(format!("{} Signing in", spinner_symbol()).fg(colors::SECONDARY))
        } else if let Some(message) = &self.message {
            Line::from(message.clone().fg(colors::ACCENT))
        } else {
            Line::default()
        };
        f.render_widget(Paragraph::new(status).centered(), status_area);

        let help = match self.mode {
            Mode::Login => "enter: sign in  ctrl-t: register instead",
            Mode::Register => "enter: register  ctrl-t: sign in instead",
        };
        f.render_widget(
            Paragraph::new(help.fg(colors::NEUTRAL)).centered(),
            help_area,
        );
    }

    async fn handle_input(
        &mut self,
        key: KeyEvent,
        _state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action> {
        if self.submitting {
            return Some(Action::None);
        }
        match key.code {
            KeyCode::Char('t') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.toggle_mode();
            }
            KeyCode::Enter => {
                if let Some(event) = self.submission() {
                    let _ = ctx.event_tx.send(event);
                }
            }
            _ => {
                self.form_mut().handle_key(key);
            }
        }
        Some(Action::None)
    }

    fn captures_input(&self) -> bool {
        true
    }
}
