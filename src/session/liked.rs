use std::collections::HashSet;

use crate::http::models::{Track, TrackId};

/// Track ids the current user has liked.
#[derive(Debug, Clone, Default)]
pub struct LikedSet {
    ids: HashSet<TrackId>,
}

impl LikedSet {
    pub fn contains(&self, id: TrackId) -> bool {
        self.ids.contains(&id)
    }

    pub fn replace_with(&mut self, tracks: &[Track]) {
        self.ids = tracks.iter().map(|t| t.id).collect();
    }

    pub fn set(&mut self, id: TrackId, liked: bool) {
        if liked {
            self.ids.insert(id);
        } else {
            self.ids.remove(&id);
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}
