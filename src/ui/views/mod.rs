pub mod auth;
pub mod discover;
pub mod home;
pub mod library;
pub mod profile;
pub mod search;
pub mod upload;

pub use auth::Auth;
pub use discover::Discover;
pub use home::Home;
pub use library::Library;
pub use profile::Profile;
pub use search::Search;
pub use upload::Upload;

use crate::ui::{state::Route, traits::View};

pub fn view_for(route: Route) -> Box<dyn View> {
    match route {
        Route::Auth => Box::new(Auth::default()),
        Route::Home => Box::new(Home::default()),
        Route::Search => Box::new(Search::default()),
        Route::Library => Box::new(Library::default()),
        Route::Discover => Box::new(Discover::default()),
        Route::Upload => Box::new(Upload::default()),
        Route::Profile => Box::new(Profile::default()),
    }
}
