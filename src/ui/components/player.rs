use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Stylize,
    text::Line,
    widgets::{Paragraph, Widget},
};

use crate::{
    audio::system::AudioSystem,
    ui::components::{controls::PlayerControlsWidget, progress::ProgressWidget},
    util::{colors, format::format_duration},
};

pub const PLAYER_HEIGHT: u16 = 3;
const CONTROLS_WIDTH: u16 = 19;

/// Bottom player bar. Full mode shows progress and controls, minimized mode
/// collapses to a single status line.
pub struct PlayerWidget<'a> {
    audio: &'a AudioSystem,
    is_liked: bool,
    minimized: bool,
}

impl<'a> PlayerWidget<'a> {
    pub fn new(audio: &'a AudioSystem, is_liked: bool, minimized: bool) -> Self {
        Self {
            audio,
            is_liked,
            minimized,
        }
    }

    pub fn height(minimized: bool) -> u16 {
        if minimized { 1 } else { PLAYER_HEIGHT }
    }

    /// Clickable progress bar for a player drawn in `area`, if any.
    pub fn progress_area(area: Rect, minimized: bool) -> Option<Rect> {
        if minimized {
            return None;
        }
        let [progress, _] = split(area);
        Some(ProgressWidget::bar_area(progress))
    }
}

fn split(area: Rect) -> [Rect; 2] {
    Layout::horizontal([Constraint::Min(0), Constraint::Length(CONTROLS_WIDTH)]).areas(area)
}

impl Widget for PlayerWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(track) = self.audio.current_track() else {
            return;
        };
        let binding = self.audio.binding();
        let queue = self.audio.queue();

        if self.minimized {
            let icon = if self.audio.is_playing() { "▶" } else { "⏸" };
            let position = format_duration(self.audio.progress().position().as_secs());
            let line = Line::from(vec![
                format!(" {icon} ").fg(colors::PRIMARY),
                track.title.clone().fg(colors::PRIMARY),
                format!("  {}  ", track.artist_name()).fg(colors::SECONDARY),
                position.fg(colors::SECONDARY),
            ]);
            Paragraph::new(line).render(area, buf);
            return;
        }

        let [progress_area, controls_area] = split(area);
        ProgressWidget::new(
            binding.progress(),
            track,
            binding.status(),
            self.audio.is_playing(),
            self.is_liked,
        )
        .render(progress_area, buf);

        PlayerControlsWidget::new(
            queue.repeat(),
            queue.is_shuffled(),
            binding.volume_percent(),
            binding.is_muted(),
        )
        .render(controls_area, buf);
    }
}
