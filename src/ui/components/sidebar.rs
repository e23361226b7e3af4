use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::Line,
    widgets::{List, ListItem, Paragraph, Widget},
};

use crate::{ui::state::Route, util::colors};

pub struct Sidebar<'a> {
    selected: Option<usize>,
    username: Option<&'a str>,
}

impl<'a> Sidebar<'a> {
    pub fn new(selected: Option<usize>, username: Option<&'a str>) -> Self {
        Self { selected, username }
    }
}

impl Widget for Sidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [list_area, user_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);

        let items: Vec<ListItem> = Route::SIDEBAR
            .iter()
            .enumerate()
            .map(|(i, route)| {
                let style = if Some(i) == self.selected {
                    Style::default()
                        .fg(colors::PRIMARY)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors::SECONDARY)
                };
                ListItem::new(format!(" {} {}", i + 1, route.title())).style(style)
            })
            .collect();

        List::new(items).render(list_area, buf);

        if let Some(username) = self.username {
            Paragraph::new(Line::from(format!(" @{username}").fg(colors::NEUTRAL)))
                .render(user_area, buf);
        }
    }
}
