use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Style, Stylize},
    symbols::{self, border},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget},
};

use crate::util::colors;

pub struct PlayerControlsWidget {
    repeat: bool,
    shuffle: bool,
    volume: u8,
    muted: bool,
}

impl PlayerControlsWidget {
    pub fn new(repeat: bool, shuffle: bool, volume: u8, muted: bool) -> Self {
        Self {
            repeat,
            shuffle,
            volume,
            muted,
        }
    }
}

impl Widget for PlayerControlsWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let repeat_icon = if self.repeat {
            "⟳".fg(colors::PRIMARY)
        } else {
            "⟳".fg(colors::NEUTRAL)
        };
        let shuffle_icon = if self.shuffle {
            "⤨".fg(colors::PRIMARY)
        } else {
            "⤨".fg(colors::NEUTRAL)
        };

        let mut controls_text = Line::default();
        controls_text.push_span(repeat_icon);
        controls_text.push_span("  ");
        controls_text.push_span(shuffle_icon);

        let [controls_area, volume_area] =
            Layout::horizontal([Constraint::Length(7), Constraint::Length(12)]).areas(area);

        let controls_block = Block::default()
            .borders(Borders::TOP | Borders::BOTTOM)
            .border_set(border::Set {
                top_left: symbols::line::ROUNDED.horizontal_down,
                top_right: symbols::line::ROUNDED.horizontal_down,
                bottom_left: symbols::line::ROUNDED.horizontal_up,
                bottom_right: symbols::line::ROUNDED.horizontal_up,
                ..symbols::border::ROUNDED
            });
        Paragraph::new(controls_text)
            .block(controls_block)
            .centered()
            .render(controls_area, buf);

        let (ratio, label) = if self.muted {
            (0.0, Span::from("muted").fg(colors::SECONDARY))
        } else {
            (
                f64::from(self.volume.min(100)) / 100.0,
                Span::from(format!("{}%", self.volume)),
            )
        };

        let volume_block = Block::default()
            .borders(Borders::ALL)
            .border_set(border::Set {
                top_left: symbols::line::ROUNDED.horizontal_down,
                bottom_left: symbols::line::ROUNDED.horizontal_up,
                ..symbols::border::ROUNDED
            });

        Gauge::default()
            .block(volume_block)
            .gauge_style(Style::new().fg(colors::PRIMARY).bg(colors::NEUTRAL))
            .ratio(ratio)
            .label(label)
            .render(volume_area, buf);
    }
}
