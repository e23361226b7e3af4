use url::Url;

use crate::{audio::error::MediaError, http::models::Track};

/// Turns a track's `audio_file` into something a media element can fetch.
#[derive(Debug, Clone)]
pub struct UrlResolver {
    media_origin: Url,
}

impl UrlResolver {
    pub fn new(mut media_origin: Url) -> Self {
        if !media_origin.path().ends_with('/') {
            let path = format!("{}/", media_origin.path());
            media_origin.set_path(&path);
        }
        Self { media_origin }
    }

    pub fn resolve(&self, track: &Track) -> Result<Url, MediaError> {
        let raw = track.audio_file.trim();
        if raw.is_empty() {
            return Err(MediaError::InvalidUrl(format!(
                "track {} has no audio file",
                track.id
            )));
        }

        let lower = raw.to_ascii_lowercase();
        let resolved = if lower.starts_with("http://") || lower.starts_with("https://") {
            Url::parse(raw)
        } else {
            self.media_origin.join(raw)
        };
        resolved.map_err(|e| MediaError::InvalidUrl(format!("{raw}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::track;

    fn resolver() -> UrlResolver {
        UrlResolver::new(Url::parse("http://localhost:8000").unwrap())
    }

    #[test]
    fn absolute_urls_are_used_as_is() {
        let mut t = track(1, 100);
        t.audio_file = "https://cdn.example.com/a.mp3".into();
        assert_eq!(
            resolver().resolve(&t).unwrap().as_str(),
            "https://cdn.example.com/a.mp3"
        );
    }

    #[test]
    fn relative_paths_join_the_media_origin() {
        let mut t = track(1, 100);
        t.audio_file = "/media/tracks/a.mp3".into();
        assert_eq!(
            resolver().resolve(&t).unwrap().as_str(),
            "http://localhost:8000/media/tracks/a.mp3"
        );

        t.audio_file = "media/tracks/b.mp3".into();
        assert_eq!(
            resolver().resolve(&t).unwrap().as_str(),
            "http://localhost:8000/media/tracks/b.mp3"
        );
    }

    #[test]
    fn origin_with_a_path_keeps_it_for_relative_files() {
        let resolver = UrlResolver::new(Url::parse("http://host/static").unwrap());
        let mut t = track(1, 100);
        t.audio_file = "tracks/a.mp3".into();
        assert_eq!(
            resolver.resolve(&t).unwrap().as_str(),
            "http://host/static/tracks/a.mp3"
        );
    }

    #[test]
    fn empty_audio_file_is_an_error() {
        let mut t = track(1, 100);
        t.audio_file = "  ".into();
        assert!(matches!(resolver().resolve(&t), Err(MediaError::InvalidUrl(_))));
    }
}
