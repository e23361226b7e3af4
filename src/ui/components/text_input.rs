use ratatui::{
    buffer::Buffer,
    crossterm::event::{KeyCode, KeyEvent, KeyModifiers},
    layout::{Constraint, Layout, Rect},
    style::{Style, Stylize},
    text::Line,
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use crate::util::colors;

pub const FIELD_HEIGHT: u16 = 3;

#[derive(Debug, Clone, Default)]
pub struct TextField {
    /// Name used by validation errors to find the field.
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
    pub placeholder: Option<String>,
    pub error: Option<String>,
    masked: bool,
}

impl TextField {
    pub fn new(label: &'static str) -> Self {
        Self {
            key: label,
            label,
            ..Default::default()
        }
    }

    pub fn keyed(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            ..Self::new(label)
        }
    }

    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn trimmed(&self) -> &str {
        self.value.trim()
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.error = None;
    }

    /// Returns true when the key edited the value.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.value.clear();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.value.push(c);
            }
            KeyCode::Backspace => {
                self.value.pop();
            }
            _ => return false,
        }
        self.error = None;
        true
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, focused: bool) {
        let border = if self.error.is_some() {
            colors::ACCENT
        } else if focused {
            colors::PRIMARY
        } else {
            colors::NEUTRAL
        };

        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .title(format!(" {} ", self.label));
        if let Some(error) = &self.error {
            block = block.title_bottom(Line::from(format!(" {error} ").fg(colors::ACCENT)));
        }

        let cursor = if focused { "▏" } else { "" };
        let line = if self.value.is_empty() {
            let hint = self.placeholder.clone().unwrap_or_default();
            Line::from(vec![cursor.fg(colors::PRIMARY), hint.fg(colors::NEUTRAL)])
        } else if self.masked {
            Line::from(format!("{}{cursor}", "•".repeat(self.value.chars().count())))
        } else {
            Line::from(format!("{}{cursor}", self.value))
        };

        Paragraph::new(line).block(block).render(area, buf);
    }
}

/// A vertical stack of fields with one focused at a time.
#[derive(Debug, Clone, Default)]
pub struct Form {
    pub fields: Vec<TextField>,
    pub focus: usize,
}

impl Form {
    pub fn new(fields: Vec<TextField>) -> Self {
        Self { fields, focus: 0 }
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields.get(index).map(TextField::trimmed).unwrap_or_default()
    }

    pub fn raw_value(&self, index: usize) -> &str {
        self.fields.get(index).map(|f| f.value.as_str()).unwrap_or_default()
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    /// Moves focus for Tab/arrows, otherwise edits the focused field.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.focus_next();
                true
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_prev();
                true
            }
            _ => match self.fields.get_mut(self.focus) {
                Some(field) => field.handle_key(key),
                None => false,
            },
        }
    }

    pub fn clear_errors(&mut self) {
        for field in &mut self.fields {
            field.error = None;
        }
    }

    pub fn set_error(&mut self, index: usize, message: impl Into<String>) {
        if let Some(field) = self.fields.get_mut(index) {
            field.error = Some(message.into());
            self.focus = index;
        }
    }

    pub fn set_field_error(&mut self, key: &str, message: impl Into<String>) {
        let index = self.fields.iter().position(|f| f.key == key).unwrap_or(0);
        self.set_error(index, message);
    }

    pub fn height(&self) -> u16 {
        self.fields.len() as u16 * FIELD_HEIGHT
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, focused: bool) {
        let rows = Layout::vertical(vec![Constraint::Length(FIELD_HEIGHT); self.fields.len()])
            .split(area);
        for (i, (field, row)) in self.fields.iter().zip(rows.iter()).enumerate() {
            field.render(*row, buf, focused && i == self.focus);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_clears_the_field_error() {
        let mut field = TextField::new("Title");
        field.error = Some("title is required".into());
        assert!(field.handle_key(key(KeyCode::Char('a'))));
        assert_eq!(field.value, "a");
        assert!(field.error.is_none());

        field.handle_key(key(KeyCode::Backspace));
        assert!(field.value.is_empty());
    }

    #[test]
    fn focus_wraps_in_both_directions() {
        let mut form = Form::new(vec![TextField::new("a"), TextField::new("b")]);
        form.handle_key(key(KeyCode::Up));
        assert_eq!(form.focus, 1);
        form.handle_key(key(KeyCode::Tab));
        assert_eq!(form.focus, 0);
    }

    #[test]
    fn set_error_moves_focus_to_the_field() {
        let mut form = Form::new(vec![TextField::new("a"), TextField::new("b")]);
        form.set_error(1, "required");
        assert_eq!(form.focus, 1);
        assert_eq!(form.fields[1].error.as_deref(), Some("required"));
        form.clear_errors();
        assert!(form.fields[1].error.is_none());
    }

    #[test]
    fn field_errors_are_routed_by_key() {
        let mut form = Form::new(vec![
            TextField::keyed("username", "Username"),
            TextField::keyed("password_confirm", "Confirm password"),
        ]);
        form.set_field_error("password_confirm", "passwords do not match");
        assert_eq!(form.focus, 1);
        assert!(form.fields[0].error.is_none());
    }
}
