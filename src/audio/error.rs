use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MediaError {
    #[error("audio output device error: {0}")]
    Device(String),

    #[error("failed to load media: {0}")]
    Load(String),

    #[error("decoding error: {0}")]
    Decode(String),

    #[error("playback failed: {0}")]
    Playback(String),

    #[error("invalid media url: {0}")]
    InvalidUrl(String),
}
