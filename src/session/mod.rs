//! Who is logged in, with the token and profile cached in storage.

mod liked;
mod recent;

pub use liked::LikedSet;
pub use recent::{MAX_RECENT_SEARCHES, RecentSearches};

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    http::{
        ApiService,
        models::{LoginResponse, RegisterResponse, Track, TrackId, UserProfile},
    },
    storage::{KeyValueStore, keys, load_json, save_json},
};

pub struct Session {
    api: Arc<ApiService>,
    store: Arc<dyn KeyValueStore>,
    user: Option<UserProfile>,
    liked: LikedSet,
}

impl Session {
    /// Loads token and user eagerly. Both must be present and readable,
    /// otherwise both are dropped and the session starts logged out.
    pub fn restore(api: Arc<ApiService>, store: Arc<dyn KeyValueStore>) -> Self {
        let token = store.get(keys::TOKEN).ok().flatten().filter(|t| !t.is_empty());
        let user = match load_json::<UserProfile>(store.as_ref(), keys::USER) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Stored user is unreadable");
                None
            }
        };

        let mut session = Self {
            api,
            store,
            user: None,
            liked: LikedSet::default(),
        };

        match (token, user) {
            (Some(token), Some(user)) => {
                info!(username = %user.username, "Restored session");
                session.api.set_token(Some(token));
                session.user = Some(user);
            }
            (None, None) => {}
            _ => session.forget(),
        }
        session
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.api.token().is_some()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn liked(&self) -> &LikedSet {
        &self.liked
    }

    pub fn is_liked(&self, id: TrackId) -> bool {
        self.liked.contains(id)
    }

    /// The login answer only carries id, username and email; the full
    /// profile arrives later through [`Session::apply_profile`].
    pub fn apply_login(&mut self, response: &LoginResponse) {
        let user = UserProfile {
            id: response.user_id,
            username: response.username.clone(),
            email: response.email.clone(),
            ..Default::default()
        };
        self.establish(&response.token, user);
    }

    pub fn apply_registration(&mut self, response: &RegisterResponse) {
        self.establish(&response.token, response.user.clone());
    }

    pub fn apply_profile(&mut self, user: UserProfile) {
        self.persist_user(&user);
        self.user = Some(user);
    }

    pub fn set_liked_tracks(&mut self, tracks: &[Track]) {
        self.liked.replace_with(tracks);
    }

    pub fn apply_like_toggled(&mut self, id: TrackId, liked: bool) {
        self.liked.set(id, liked);
    }

    /// Local logout, used both after the logout call and when the backend
    /// rejects the token.
    pub fn clear(&mut self) {
        self.forget();
        self.liked.clear();
        self.user = None;
    }

    fn establish(&mut self, token: &str, user: UserProfile) {
        self.api.set_token(Some(token.to_string()));
        if let Err(e) = self.store.set(keys::TOKEN, token) {
            warn!(error = %e, "Failed to persist token");
        }
        self.persist_user(&user);
        self.user = Some(user);
    }

    fn persist_user(&self, user: &UserProfile) {
        if let Err(e) = save_json(self.store.as_ref(), keys::USER, user) {
            warn!(error = %e, "Failed to persist user");
        }
    }

    fn forget(&mut self) {
        self.api.set_token(None);
        for key in [keys::TOKEN, keys::USER] {
            if let Err(e) = self.store.remove(key) {
                warn!(key, error = %e, "Failed to remove stored value");
            }
        }
    }
}
