mod simulated;

#[cfg(feature = "audio")]
mod rodio;

pub use simulated::SimulatedElement;

#[cfg(feature = "audio")]
pub use self::rodio::RodioElement;

use std::time::Duration;

use flume::Sender;

use crate::{
    audio::{config::AudioConfig, traits::MediaElement},
    event::events::Event,
};

/// Notification from a media element, tagged with the load token it
/// belongs to so late events from a replaced source can be dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaEvent {
    pub token: u64,
    pub kind: MediaEventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaEventKind {
    LoadStart,
    CanPlay,
    DurationChange(Duration),
    TimeUpdate(Duration),
    Ended,
    Error(String),
}

pub(crate) fn emit(tx: &Sender<Event>, token: u64, kind: MediaEventKind) {
    let _ = tx.send(Event::Media(MediaEvent { token, kind }));
}

/// rodio output when built with the `audio` feature and a device opens,
/// the simulated clock otherwise.
pub fn default_element(event_tx: Sender<Event>, config: &AudioConfig) -> Box<dyn MediaElement> {
    #[cfg(feature = "audio")]
    {
        match RodioElement::new(event_tx.clone()) {
            Ok(element) => return Box::new(element),
            Err(e) => tracing::warn!(error = %e, "Falling back to simulated playback"),
        }
    }

    Box::new(SimulatedElement::new(event_tx, config.tick))
}
