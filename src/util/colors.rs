use ratatui::style::Color;

pub const PRIMARY: Color = Color::from_u32(0x00e8e8e8);
pub const SECONDARY: Color = Color::from_u32(0x008a8a8a);
pub const NEUTRAL: Color = Color::from_u32(0x00404040);
pub const BACKGROUND: Color = Color::from_u32(0x000d0d0d);
pub const ACCENT: Color = Color::from_u32(0x00ef4444);
pub const SUCCESS: Color = Color::from_u32(0x0022c55e);
