use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::{
    audio::traits::PlayReporter,
    http::{
        ApiService,
        models::{PlayInteraction, TrackId},
    },
};

/// Sends play reports to `POST /tracks/{id}/play/` on a detached task.
pub struct ApiPlayReporter {
    api: Arc<ApiService>,
}

impl ApiPlayReporter {
    pub fn new(api: Arc<ApiService>) -> Self {
        Self { api }
    }
}

impl PlayReporter for ApiPlayReporter {
    fn report(&self, track_id: TrackId, interaction: PlayInteraction) {
        let Ok(handle) = Handle::try_current() else {
            warn!(track_id, "No runtime, dropping play report");
            return;
        };

        let api = self.api.clone();
        handle.spawn(async move {
            match api.report_play(track_id, &interaction).await {
                Ok(()) => debug!(track_id, completed = interaction.is_completion(), "Play reported"),
                Err(e) => warn!(track_id, error = %e, "Failed to report play"),
            }
        });
    }
}
