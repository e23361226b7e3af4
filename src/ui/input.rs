use crate::ui::traits::Action;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Global player shortcuts, consulted after the active view passed on a key.
pub struct InputHandler;

impl InputHandler {
    pub fn handle_key(key: KeyEvent) -> Option<Action> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Action::Quit),
            (KeyCode::Char('Q'), _) => Some(Action::Quit),
            (KeyCode::Char(' '), _) => Some(Action::PlayPause),
            (KeyCode::Char('n'), _) => Some(Action::NextTrack),
            (KeyCode::Char('p'), _) => Some(Action::PreviousTrack),
            (KeyCode::Char('+'), _) | (KeyCode::Char('='), _) => Some(Action::VolumeUp),
            (KeyCode::Char('-'), _) => Some(Action::VolumeDown),
            (KeyCode::Char('H'), _) => Some(Action::SeekBackward),
            (KeyCode::Char('L'), _) => Some(Action::SeekForward),
            (KeyCode::Char('r'), _) => Some(Action::ToggleRepeat),
            (KeyCode::Char('s'), _) => Some(Action::ToggleShuffle),
            (KeyCode::Char('m'), _) => Some(Action::ToggleMute),
            (KeyCode::Char('F'), _) => Some(Action::ToggleLikeCurrent),
            (KeyCode::Char('z'), _) => Some(Action::TogglePlayerMinimized),
            (KeyCode::Char('x'), _) => Some(Action::TogglePlayerHidden),
            (KeyCode::Esc, _) => Some(Action::Back),
            (KeyCode::Char(c @ '1'..='6'), _) => Some(Action::SwitchTab(c as usize - '1' as usize)),
            _ => None,
        }
    }
}
