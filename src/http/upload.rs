use std::path::{Path, PathBuf};

use reqwest::{
    Body, Method,
    multipart::{Form, Part},
};
use tracing::{debug, info};

use super::{
    ApiService,
    error::{Result, ValidationError},
    models::UploadResponse,
};

pub const AUDIO_MIME_TYPES: &[&str] = &["audio/mp3", "audio/mpeg", "audio/wav", "audio/ogg"];
pub const IMAGE_MIME_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];
pub const MAX_AUDIO_BYTES: u64 = 50 * 1024 * 1024;
pub const MAX_COVER_BYTES: u64 = 5 * 1024 * 1024;

const CHUNK_SIZE: usize = 64 * 1024;

/// Guess MIME type from file extension.
pub fn mime_type_for_file(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") | Some("oga") => "audio/ogg",
        Some("flac") => "audio/flac",
        Some("m4a") | Some("aac") => "audio/aac",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadRequest {
    pub audio_path: Option<PathBuf>,
    pub cover_path: Option<PathBuf>,
    pub title: String,
    pub genre: Option<String>,
    pub description: String,
    pub tags: String,
}

impl UploadRequest {
    /// The typed title, or the audio file stem when left blank.
    pub fn effective_title(&self) -> String {
        let typed = self.title.trim();
        if !typed.is_empty() {
            return typed.to_string();
        }
        self.audio_path
            .as_deref()
            .and_then(|p| p.file_stem())
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string()
    }

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let audio = self.audio_path.as_deref().ok_or(ValidationError::MissingAudio)?;
        let audio_size = file_size(audio)?;
        let audio_mime = mime_type_for_file(audio);
        if !AUDIO_MIME_TYPES.contains(&audio_mime) {
            return Err(ValidationError::UnsupportedAudio(audio_mime.to_string()));
        }
        if audio_size > MAX_AUDIO_BYTES {
            return Err(ValidationError::AudioTooLarge);
        }

        if let Some(cover) = self.cover_path.as_deref() {
            let cover_size = file_size(cover)?;
            let cover_mime = mime_type_for_file(cover);
            if !IMAGE_MIME_TYPES.contains(&cover_mime) {
                return Err(ValidationError::UnsupportedImage(cover_mime.to_string()));
            }
            if cover_size > MAX_COVER_BYTES {
                return Err(ValidationError::ImageTooLarge);
            }
        }

        if self.effective_title().is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        Ok(())
    }
}

fn file_size(path: &Path) -> std::result::Result<u64, ValidationError> {
    std::fs::metadata(path)
        .ok()
        .filter(|m| m.is_file())
        .map(|m| m.len())
        .ok_or_else(|| ValidationError::FileNotFound(path.display().to_string()))
}

fn file_name(path: &Path, fallback: &str) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(fallback)
        .to_string()
}

impl ApiService {
    /// Uploads a track as multipart `POST /tracks/`. `progress` receives
    /// the percentage of the audio body handed to the transport so far.
    pub async fn upload_track<F>(
        &self,
        request: &UploadRequest,
        progress: F,
    ) -> Result<UploadResponse>
    where
        F: Fn(u8) + Send + Sync + 'static,
    {
        request.validate()?;
        let audio_path = request.audio_path.as_deref().ok_or(ValidationError::MissingAudio)?;

        debug!(file = %audio_path.display(), "Uploading track");

        let contents = tokio::fs::read(audio_path).await?;
        let total = contents.len() as u64;
        let chunks: Vec<Vec<u8>> = contents.chunks(CHUNK_SIZE).map(<[u8]>::to_vec).collect();

        let mut sent = 0u64;
        progress(0);
        let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
            sent += chunk.len() as u64;
            let percent = if total == 0 { 100 } else { sent * 100 / total };
            progress(percent.min(100) as u8);
            Ok::<_, std::io::Error>(chunk)
        }));

        let audio_part = Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(file_name(audio_path, "track"))
            .mime_str(mime_type_for_file(audio_path))?;

        let mut form = Form::new()
            .part("audio_file", audio_part)
            .text("title", request.effective_title())
            .text("description", request.description.clone())
            .text("tags", request.tags.clone());

        if let Some(genre) = request.genre.as_ref().filter(|g| !g.is_empty()) {
            form = form.text("genre", genre.clone());
        }

        if let Some(cover_path) = request.cover_path.as_deref() {
            let cover = tokio::fs::read(cover_path).await?;
            let cover_part = Part::bytes(cover)
                .file_name(file_name(cover_path, "cover"))
                .mime_str(mime_type_for_file(cover_path))?;
            form = form.part("cover_image", cover_part);
        }

        let url = self.endpoint("tracks/")?;
        let response = self.request(Method::POST, url).multipart(form).send().await?;
        let uploaded: UploadResponse = Self::parse(response).await?;

        info!(track_id = uploaded.id, size = total, "Track uploaded");
        Ok(uploaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(name: &str, size: usize) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&vec![0u8; size]).unwrap();
        (dir, path)
    }

    #[test]
    fn mime_types_follow_extensions() {
        assert_eq!(mime_type_for_file(Path::new("a.MP3")), "audio/mpeg");
        assert_eq!(mime_type_for_file(Path::new("b.ogg")), "audio/ogg");
        assert_eq!(mime_type_for_file(Path::new("c.webp")), "image/webp");
        assert_eq!(mime_type_for_file(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn title_defaults_to_file_stem() {
        let request = UploadRequest {
            audio_path: Some(PathBuf::from("/music/Late Night.mp3")),
            ..Default::default()
        };
        assert_eq!(request.effective_title(), "Late Night");
    }

    #[test]
    fn audio_is_required() {
        assert_eq!(
            UploadRequest::default().validate(),
            Err(ValidationError::MissingAudio)
        );
    }

    #[test]
    fn rejects_unsupported_audio_format() {
        let (_dir, path) = temp_file("song.flac", 16);
        let request = UploadRequest {
            audio_path: Some(path),
            ..Default::default()
        };
        assert_eq!(
            request.validate(),
            Err(ValidationError::UnsupportedAudio("audio/flac".into()))
        );
    }

    #[test]
    fn rejects_oversized_cover() {
        let (_audio_dir, audio) = temp_file("song.mp3", 16);
        let (_cover_dir, cover) = temp_file("cover.png", MAX_COVER_BYTES as usize + 1);
        let request = UploadRequest {
            audio_path: Some(audio),
            cover_path: Some(cover),
            ..Default::default()
        };
        assert_eq!(request.validate(), Err(ValidationError::ImageTooLarge));
    }

    #[test]
    fn accepts_valid_request() {
        let (_audio_dir, audio) = temp_file("song.wav", 1024);
        let (_cover_dir, cover) = temp_file("cover.jpg", 1024);
        let request = UploadRequest {
            audio_path: Some(audio),
            cover_path: Some(cover),
            title: "Song".into(),
            ..Default::default()
        };
        assert_eq!(request.validate(), Ok(()));
    }

    #[test]
    fn missing_file_is_reported() {
        let request = UploadRequest {
            audio_path: Some(PathBuf::from("/definitely/not/here.mp3")),
            ..Default::default()
        };
        assert!(matches!(request.validate(), Err(ValidationError::FileNotFound(_))));
    }
}
