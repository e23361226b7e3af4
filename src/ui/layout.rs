use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Style, Stylize},
    symbols::border,
    text::Line,
    widgets::{Block, Borders, Paragraph},
};

use crate::{
    ui::{
        app::App,
        components::{player::PlayerWidget, sidebar::Sidebar},
        state::Route,
    },
    util::colors,
};

const SIDEBAR_WIDTH: u16 = 20;

pub struct AppLayout<'a> {
    pub app: &'a mut App,
}

impl<'a> AppLayout<'a> {
    pub fn new(app: &'a mut App) -> Self {
        Self { app }
    }

    pub fn render(self, f: &mut Frame, area: Rect) {
        f.buffer_mut()
            .set_style(area, Style::new().bg(colors::BACKGROUND));

        let [body, status_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);
        self.render_status(f, status_area);

        if self.app.state.ui.current_route == Route::Auth {
            self.app.state.ui.progress_area = None;
            let app = &mut *self.app;
            app.router.render(f, body, &app.state, &app.ctx);
            return;
        }

        let ui = &self.app.state.ui;
        let show_player = !ui.player_hidden && self.app.ctx.audio_system.current_track().is_some();
        let player_height = if show_player {
            PlayerWidget::height(ui.player_minimized)
        } else {
            0
        };

        let [main_area, player_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(player_height)]).areas(body);
        let [sidebar_area, content_area] =
            Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(1)])
                .areas(main_area);

        let sidebar_block = Block::default()
            .borders(Borders::ALL)
            .border_set(border::ROUNDED)
            .title("musrec")
            .title_alignment(Alignment::Center);
        let content_block = Block::default()
            .borders(Borders::ALL)
            .border_set(border::ROUNDED)
            .title(format!(" {} ", self.app.state.ui.current_route.title()));

        let sidebar_inner = sidebar_block.inner(sidebar_area);
        let content_inner = content_block.inner(content_area);
        f.render_widget(sidebar_block, sidebar_area);
        f.render_widget(content_block, content_area);

        let username = self.app.ctx.session.user().map(|u| u.username.as_str());
        let selected = self.app.state.ui.current_route.index();
        f.render_widget(Sidebar::new(selected, username), sidebar_inner);

        let app = &mut *self.app;
        app.router.render(f, content_inner, &app.state, &app.ctx);

        if show_player {
            let minimized = app.state.ui.player_minimized;
            let liked = app
                .ctx
                .audio_system
                .current_track()
                .is_some_and(|t| app.ctx.session.is_liked(t.id));
            f.render_widget(
                PlayerWidget::new(&app.ctx.audio_system, liked, minimized),
                player_area,
            );
            app.state.ui.progress_area = PlayerWidget::progress_area(player_area, minimized);
        } else {
            app.state.ui.progress_area = None;
        }
    }

    fn render_status(&self, f: &mut Frame, area: Rect) {
        let ui = &self.app.state.ui;
        let line = if let Some(error) = &ui.error_message {
            Line::from(format!(" {error}").fg(colors::ACCENT))
        } else if let Some(status) = &ui.status_message {
            Line::from(format!(" {status}").fg(colors::SUCCESS))
        } else if ui.current_route == Route::Auth {
            Line::from(" ctrl-c: quit".fg(colors::NEUTRAL))
        } else {
            Line::from(
                " tab: pages  space: play/pause  n/p: next/prev  s: shuffle  r: repeat  +/-: volume  z/x: player  Q: quit"
                    .fg(colors::NEUTRAL),
            )
        };
        f.render_widget(Paragraph::new(line), area);
    }
}
