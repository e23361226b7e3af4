#[derive(Debug, Clone, Default, PartialEq)]
pub enum MediaStatus {
    /// Nothing loaded.
    #[default]
    Idle,
    Loading,
    Ready,
    Error(String),
}

impl MediaStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, MediaStatus::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            MediaStatus::Error(message) => Some(message),
            _ => None,
        }
    }
}
