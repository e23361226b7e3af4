use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Margin, Rect},
    style::{Style, Stylize},
    symbols::{self, border},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Widget},
};

use crate::{
    audio::{progress::TrackProgress, state::MediaStatus},
    http::models::Track,
    ui::components::spinner::spinner_symbol,
    util::{colors, format::format_duration},
};

pub struct ProgressWidget<'a> {
    progress: &'a TrackProgress,
    track: &'a Track,
    status: &'a MediaStatus,
    is_playing: bool,
    is_liked: bool,
}

impl<'a> ProgressWidget<'a> {
    pub fn new(
        progress: &'a TrackProgress,
        track: &'a Track,
        status: &'a MediaStatus,
        is_playing: bool,
        is_liked: bool,
    ) -> Self {
        Self {
            progress,
            track,
            status,
            is_playing,
            is_liked,
        }
    }

    /// The clickable bar inside the border.
    pub fn bar_area(area: Rect) -> Rect {
        area.inner(Margin::new(1, 1))
    }

    fn label(&self) -> Span<'static> {
        if let Some(error) = self.status.error() {
            return format!("Playback failed: {error}").fg(colors::ACCENT);
        }
        if self.status.is_loading() {
            return format!("{} Loading", spinner_symbol()).fg(colors::PRIMARY);
        }
        let position = format_duration(self.progress.position().as_secs());
        let total = self
            .progress
            .duration()
            .map(|d| format_duration(d.as_secs()))
            .unwrap_or_else(|| "--:--".to_string());
        format!("{position} / {total}").fg(colors::PRIMARY)
    }
}

impl Widget for ProgressWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let state_icon = if self.is_playing { "▶" } else { "⏸" };
        let heart = if self.is_liked {
            "♥".fg(colors::ACCENT)
        } else {
            "♡".fg(colors::SECONDARY)
        };
        let title = Line::from(vec![
            format!("{state_icon}  {} by {} ", self.track.title, self.track.artist_name()).into(),
            heart,
        ]);

        let gauge = Gauge::default()
            .block(
                Block::default()
                    .title_top(title)
                    .title_alignment(Alignment::Center)
                    .borders(Borders::ALL)
                    .border_set(border::Set {
                        top_right: symbols::line::ROUNDED.horizontal_down,
                        bottom_right: symbols::line::ROUNDED.horizontal_up,
                        ..symbols::border::ROUNDED
                    }),
            )
            .ratio(self.progress.ratio().clamp(0.0, 1.0))
            .label(self.label())
            .gauge_style(Style::default().fg(colors::SECONDARY).bg(colors::BACKGROUND))
            .use_unicode(true);

        gauge.render(area, buf);
    }
}
