use async_trait::async_trait;
use ratatui::crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};

use crate::event::events::Event;
use crate::ui::{context::AppContext, state::AppState};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    PlayPause,
    NextTrack,
    PreviousTrack,
    VolumeUp,
    VolumeDown,
    ToggleMute,
    SeekForward,
    SeekBackward,
    ToggleRepeat,
    ToggleShuffle,
    ToggleLikeCurrent,
    TogglePlayerMinimized,
    TogglePlayerHidden,
    SwitchTab(usize),
    Back,
    /// Key consumed by the view, nothing else to do.
    None,
}

#[async_trait]
pub trait View: Send {
    async fn on_mount(&mut self, _ctx: &AppContext) {}

    async fn on_event(&mut self, _event: &Event, _ctx: &AppContext) {}

    fn render(&mut self, f: &mut Frame, area: Rect, state: &AppState, ctx: &AppContext);

    async fn handle_input(
        &mut self,
        key: KeyEvent,
        state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action>;

    /// While true, every key goes to the view (text fields have focus).
    fn captures_input(&self) -> bool {
        false
    }
}
