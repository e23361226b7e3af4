use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("not authorized, please log in again")]
    Unauthorized,

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

/// Field-level problems caught before a request is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("choose an audio file")]
    MissingAudio,

    #[error("title is required")]
    MissingTitle,

    #[error("unsupported audio format: {0}")]
    UnsupportedAudio(String),

    #[error("audio file is larger than 50 MB")]
    AudioTooLarge,

    #[error("unsupported image format: {0}")]
    UnsupportedImage(String),

    #[error("cover image is larger than 5 MB")]
    ImageTooLarge,

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("{0} is required")]
    MissingField(&'static str),
}

impl ValidationError {
    /// Form field the message belongs next to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingAudio
            | ValidationError::UnsupportedAudio(_)
            | ValidationError::AudioTooLarge
            | ValidationError::FileNotFound(_) => "audio_file",
            ValidationError::MissingTitle => "title",
            ValidationError::UnsupportedImage(_) | ValidationError::ImageTooLarge => {
                "cover_image"
            }
            ValidationError::PasswordMismatch => "password_confirm",
            ValidationError::MissingField(field) => field,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
