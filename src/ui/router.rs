use crate::event::events::Event;
use crate::ui::context::AppContext;
use crate::ui::state::AppState;
use crate::ui::traits::{Action, View};
use ratatui::Frame;
use ratatui::crossterm::event::KeyEvent;
use ratatui::layout::Rect;

pub struct Router {
    pub stack: Vec<Box<dyn View>>,
}

impl Router {
    pub fn new(initial_view: Box<dyn View>) -> Self {
        Self {
            stack: vec![initial_view],
        }
    }

    pub fn push(&mut self, view: Box<dyn View>) {
        self.stack.push(view);
    }

    pub fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    /// Drops the whole stack and starts over from `view`.
    pub fn reset(&mut self, view: Box<dyn View>) {
        self.stack.clear();
        self.stack.push(view);
    }

    pub fn active_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
        self.stack.last_mut()
    }

    pub fn captures_input(&self) -> bool {
        self.stack.last().is_some_and(|v| v.captures_input())
    }

    pub async fn mount_active(&mut self, ctx: &AppContext) {
        if let Some(view) = self.stack.last_mut() {
            view.on_mount(ctx).await;
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, state: &AppState, ctx: &AppContext) {
        if let Some(view) = self.stack.last_mut() {
            view.render(f, area, state, ctx);
        }
    }

    pub async fn handle_input(
        &mut self,
        key: KeyEvent,
        state: &AppState,
        ctx: &AppContext,
    ) -> Option<Action> {
        match self.stack.last_mut() {
            Some(view) => view.handle_input(key, state, ctx).await,
            None => None,
        }
    }

    pub async fn on_event(&mut self, event: &Event, ctx: &AppContext) {
        for view in &mut self.stack {
            view.on_event(event, ctx).await;
        }
    }
}
