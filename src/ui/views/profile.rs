use async_trait::async_trait;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Stylize,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};

use crate::{
    event::events::Event,
    http::models::{ProfileUpdate, UserProfile},
    ui::{
        components::text_input::{Form, TextField},
        context::AppContext,
        state::AppState,
        traits::{Action, View},
        util::fetch,
    },
    util::{colors, format::format_number, task::TaskManager},
};

#[derive(Default)]
pub struct Profile {
    user: Option<UserProfile>,
    edit: Option<Form>,
    tasks: TaskManager,
}

fn edit_form(user: &UserProfile) -> Form {
    let value = |v: &Option<String>| v.clone().unwrap_or_default();
    Form::new(vec![
        TextField::keyed("first_name", "First name").with_value(value(&user.first_name)),
        TextField::keyed("last_name", "Last name").with_value(value(&user.last_name)),
        TextField::keyed("email", "Email").with_value(user.email.clone()),
        TextField::keyed("bio", "Bio").with_value(value(&user.bio)),
        TextField::keyed("location", "Location").with_value(value(&user.location)),
        TextField::keyed("website", "Website").with_value(value(&user.website)),
    ])
}

fn profile_update(form: &Form) -> ProfileUpdate {
    let field = |i: usize| Some(form.value(i).to_string());
    ProfileUpdate {
        first_name: field(0),
        last_name: field(1),
        email: field(2),
        bio: field(3),
        location: field(4),
        website: field(5),
    }
}

impl Profile {
    fn render_details(&self, f: &mut Frame, area: Rect, user: &UserProfile, liked: usize) {
        let row = |label: &'static str, value: Option<&str>| -> Option<Line<'static>> {
            let value = value.filter(|v| !v.is_empty())?;
            Some(Line::from(vec![
                Span::from(format!(" {label:<10}")).fg(colors::SECONDARY),
                Span::from(value.to_string()).fg(colors::PRIMARY),
            ]))
        };

        let mut lines = vec![
            Line::from(user.display_name().fg(colors::PRIMARY).bold()),
            Line::from(format!("@{}", user.username).fg(colors::SECONDARY)),
            Line::default(),
        ];
        lines.extend(
            [
                row("Email", Some(user.email.as_str())),
                row("Location", user.location.as_deref()),
                row("Website", user.website.as_deref()),
                row("Bio", user.bio.as_deref()),
            ]
            .into_iter()
            .flatten(),
        );
        lines.push(Line::default());
        lines.push(Line::from(vec![
            format!(" {} ", format_number(user.listen_count)).fg(colors::PRIMARY).bold(),
            "listens   ".fg(colors::SECONDARY),
            format!("{} ", format_number(user.followers_count)).fg(colors::PRIMARY).bold(),
            "followers   ".fg(colors::SECONDARY),
            format!("{} ", format_number(user.following_count)).fg(colors::PRIMARY).bold(),
            "following   ".fg(colors::SECONDARY),
            format!("{liked} ").fg(colors::PRIMARY).bold(),
            "liked".fg(colors::SECONDARY),
        ]));

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(ratatui::style::Style::default().fg(colors::NEUTRAL))
            .title(" Profile ")
            .title_bottom(Line::from(" e: edit  o: log out ".fg(colors::NEUTRAL)));
        f.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: true }).block(block),
            area,
        );
    }
}

#[async_trait]
impl View for Profile {
    async fn on_mount(&mut self, ctx: &AppContext) {
        self.user = ctx.session.user().cloned();
        let api = ctx.api.clone();
        self.tasks.spawn(
            "profile",
            fetch(
                ctx.event_tx.clone(),
                "Loading profile",
                async move { api.fetch_current_user().await },
                Event::ProfileFetched,
            ),
        );
    }

    async fn on_event(&mut self, event: &Event, _ctx: &AppContext) {
        match event {
            Event::ProfileFetched(user) => self.user = Some(user.clone()),
            Event::ProfileUpdated(user) => {
                self.user = Some(user.clone());
                self.edit = None;
            }
            _ => {}
        }
    }

    fn render(&mut self, f: &mut Frame, area: Rect, _state: &AppState, ctx: &AppContext) {
        let Some(user) = &self.user else {
            f.render_widget(Paragraph::new("Loading profile").centered(), area);
            return;
        };

        if let Some(form) = &self.edit {
            let [form_area, help] =
                Layout::vertical([Constraint::Length(form.height()), Constraint::Length(1)])
                    .areas(area);
            form.render(form_area, f.buffer_mut(), true);
            f.render_widget(
                Paragraph::new(" ctrl-s: save  esc: cancel ".fg(colors::NEUTRAL)),
                help,
            );
            return;
        }

        self.render_details(f, area, user, ctx.session.liked().len());
    }

    async fn handle_input(
        &mut self,
        key: KeyEvent,
        _state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action> {
        if let Some(form) = &mut self.edit {
            match key.code {
                KeyCode::Esc => self.edit = None,
                KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    let _ = ctx.event_tx.send(Event::UpdateProfile(profile_update(form)));
                }
                _ => {
                    form.handle_key(key);
                }
            }
            return Some(Action::None);
        }

        match key.code {
            KeyCode::Char('e') => {
                self.edit = self.user.as_ref().map(edit_form);
                Some(Action::None)
            }
            KeyCode::Char('o') => {
                let _ = ctx.event_tx.send(Event::Logout);
                Some(Action::None)
            }
            _ => None,
        }
    }

    fn captures_input(&self) -> bool {
        self.edit.is_some()
    }
}
