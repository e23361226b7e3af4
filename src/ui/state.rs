use ratatui::layout::Rect;

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub ui: UiState,
}

#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub current_route: Route,
    pub sidebar_index: usize,
    /// Transient API failure, cleared on the next key press.
    pub error_message: Option<String>,
    pub status_message: Option<String>,
    pub player_minimized: bool,
    pub player_hidden: bool,
    /// Where the progress bar was last drawn, for click-to-seek.
    pub progress_area: Option<Rect>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Route {
    #[default]
    Auth,
    Home,
    Search,
    Library,
    Discover,
    Upload,
    Profile,
}

impl Route {
    pub const SIDEBAR: [Route; 6] = [
        Route::Home,
        Route::Search,
        Route::Library,
        Route::Discover,
        Route::Upload,
        Route::Profile,
    ];

    pub fn from_index(index: usize) -> Option<Route> {
        Self::SIDEBAR.get(index).copied()
    }

    pub fn index(self) -> Option<usize> {
        Self::SIDEBAR.iter().position(|r| *r == self)
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Auth => "Sign in",
            Route::Home => "Home",
            Route::Search => "Search",
            Route::Library => "Library",
            Route::Discover => "Discover",
            Route::Upload => "Upload",
            Route::Profile => "Profile",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidebar_indices_round_trip() {
        for (i, route) in Route::SIDEBAR.iter().enumerate() {
            assert_eq!(Route::from_index(i), Some(*route));
            assert_eq!(route.index(), Some(i));
        }
        assert_eq!(Route::Auth.index(), None);
        assert_eq!(Route::from_index(6), None);
    }
}
