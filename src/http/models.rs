use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ValidationError;

pub type TrackId = i64;
pub type UserId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistDetail {
    pub id: UserId,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    /// Seconds; the backend reports 0 when unknown.
    #[serde(default)]
    pub duration: u32,
    /// Absolute URL or a path relative to the media origin.
    #[serde(default)]
    pub audio_file: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub artist: Option<UserId>,
    #[serde(default)]
    pub artist_detail: Option<ArtistDetail>,
    #[serde(default)]
    pub genres_detail: Vec<Genre>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub play_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub is_liked: bool,
}

impl Track {
    pub fn artist_name(&self) -> &str {
        self.artist_detail
            .as_ref()
            .map(|a| a.username.as_str())
            .unwrap_or("Unknown artist")
    }

    pub fn genre_names(&self) -> String {
        self.genres_detail
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub listen_count: u64,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub following_count: u64,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if full.is_empty() {
            self.username.clone()
        } else {
            full
        }
    }
}

/// Editable subset of the profile; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub track_count: u32,
    #[serde(default)]
    pub tracks_detail: Vec<Track>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPlaylist {
    pub title: String,
    pub description: String,
    pub is_public: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationsByType {
    #[serde(default)]
    pub collaborative: Vec<Track>,
    #[serde(default)]
    pub content_based: Vec<Track>,
    #[serde(default)]
    pub popularity: Vec<Track>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::MissingField("username"));
        }
        if self.password.is_empty() {
            return Err(ValidationError::MissingField("password"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub first_name: String,
    pub last_name: String,
}

impl Registration {
    /// Checked before any request; a mismatch never reaches the server.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::MissingField("username"));
        }
        if self.email.trim().is_empty() {
            return Err(ValidationError::MissingField("email"));
        }
        if self.password.is_empty() {
            return Err(ValidationError::MissingField("password"));
        }
        if self.password != self.password_confirm {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub user: UserProfile,
    pub token: String,
}

/// Body of `POST /tracks/{id}/play/`. Start and completion reports
/// fill different fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayInteraction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_track: Option<TrackId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen_percentage: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl PlayInteraction {
    pub fn started(previous_track: Option<TrackId>) -> Self {
        Self {
            started_at: Some(Utc::now()),
            previous_track,
            ..Default::default()
        }
    }

    pub fn completed(listen_percentage: u8, duration: u32) -> Self {
        Self {
            completed_at: Some(Utc::now()),
            listen_percentage: Some(listen_percentage.min(100)),
            duration: Some(duration),
            ..Default::default()
        }
    }

    pub fn is_completion(&self) -> bool {
        self.completed_at.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    Play,
    Like,
    Skip,
    AddToPlaylist,
    Share,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkInteraction {
    pub track_id: TrackId,
    pub interaction_type: InteractionType,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailResponse {
    #[serde(default)]
    pub detail: String,
}

/// List endpoints answer either with a DRF page or a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Page { results: Vec<T> },
    Plain(Vec<T>),
}

impl<T> Listing<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Page { results } => results,
            Listing::Plain(items) => items,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub id: TrackId,
    #[serde(default)]
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn track_tolerates_missing_optional_fields() {
        let track: Track = serde_json::from_value(json!({
            "id": 7,
            "title": "Night Drive",
            "audio_file": "/media/tracks/night.mp3",
        }))
        .unwrap();

        assert_eq!(track.duration, 0);
        assert_eq!(track.artist_name(), "Unknown artist");
        assert!(track.genres_detail.is_empty());
    }

    #[test]
    fn listing_accepts_pages_and_bare_arrays() {
        let page: Listing<Genre> = serde_json::from_value(json!({
            "count": 1,
            "next": null,
            "results": [{"id": 1, "name": "Jazz"}],
        }))
        .unwrap();
        let plain: Listing<Genre> =
            serde_json::from_value(json!([{"id": 2, "name": "Rock"}])).unwrap();

        assert_eq!(page.into_vec()[0].name, "Jazz");
        assert_eq!(plain.into_vec()[0].name, "Rock");
    }

    #[test]
    fn start_report_omits_completion_fields() {
        let body = serde_json::to_value(PlayInteraction::started(Some(3))).unwrap();

        assert!(body.get("started_at").is_some());
        assert_eq!(body["previous_track"], 3);
        assert!(body.get("completed_at").is_none());
        assert!(body.get("listen_percentage").is_none());
    }

    #[test]
    fn interaction_types_use_backend_names() {
        let body = serde_json::to_value(MarkInteraction {
            track_id: 1,
            interaction_type: InteractionType::AddToPlaylist,
        })
        .unwrap();
        assert_eq!(body["interaction_type"], "add_to_playlist");
    }

    #[test]
    fn registration_rejects_mismatched_passwords() {
        let registration = Registration {
            username: "mira".into(),
            email: "mira@example.com".into(),
            password: "secret-1".into(),
            password_confirm: "secret-2".into(),
            ..Default::default()
        };
        assert_eq!(registration.validate(), Err(ValidationError::PasswordMismatch));
    }

    #[test]
    fn credentials_need_both_fields() {
        let credentials = Credentials {
            username: " ".into(),
            password: "pw".into(),
        };
        assert_eq!(
            credentials.validate(),
            Err(ValidationError::MissingField("username"))
        );
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let mut user = UserProfile {
            username: "mira".into(),
            ..Default::default()
        };
        assert_eq!(user.display_name(), "mira");

        user.first_name = Some("Mira".into());
        user.last_name = Some("Lind".into());
        assert_eq!(user.display_name(), "Mira Lind");
    }
}
