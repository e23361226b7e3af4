use std::time::Duration;

use url::Url;

use crate::{
    audio::error::MediaError,
    http::models::{PlayInteraction, TrackId},
};

/// Something that can play one audio source at a time. Implementations
/// report back asynchronously with [`crate::audio::element::MediaEvent`]s
/// tagged with the `token` given to the most recent `load`.
pub trait MediaElement: Send + Sync {
    fn load(
        &mut self,
        token: u64,
        url: &Url,
        duration_hint: Option<Duration>,
    ) -> Result<(), MediaError>;
    fn play(&mut self) -> Result<(), MediaError>;
    fn pause(&mut self);
    fn seek(&mut self, position: Duration);
    fn set_volume(&mut self, volume: f32);
    fn duration(&self) -> Option<Duration>;
}

/// Fire-and-forget play telemetry. Failures never reach the caller.
pub trait PlayReporter: Send + Sync {
    fn report(&self, track_id: TrackId, interaction: PlayInteraction);
}
