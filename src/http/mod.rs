pub mod error;
pub mod models;
pub mod upload;

use std::{sync::RwLock, time::Duration};

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;
use tracing::{debug, info};
use url::Url;

use crate::config::AppConfig;
use error::{ApiError, Result};
use models::{
    Credentials, DetailResponse, Genre, InteractionType, Listing, LoginResponse,
    MarkInteraction, NewPlaylist, PlayInteraction, Playlist, ProfileUpdate,
    RecommendationsByType, RegisterResponse, Registration, Track, TrackId,
    UserId, UserProfile,
};

/// REST client for the recommender backend. Every request carries
/// `Authorization: Token <token>` once a token is known.
pub struct ApiService {
    http: Client,
    base_url: Url,
    token: RwLock<Option<String>>,
}

impl ApiService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Self::with_base_url(config.api_url.as_str())
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(
                "url must start with http:// or https://".into(),
            ));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("musrec/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = token;
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, url = %url, "API request");
        let builder = self.http.request(method, url);
        match self.token() {
            Some(token) => builder.header("Authorization", format!("Token {token}")),
            None => builder,
        }
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body = Self::check(response).await?.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        Self::parse(self.request(Method::GET, url).send().await?).await
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        Ok(self.get::<Listing<T>>(path).await?.into_vec())
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        Self::parse(self.request(method, url).json(body).send().await?).await
    }

    /// Sends and checks the status; the body is read and discarded.
    async fn send_unit<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        let mut builder = self.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        Self::check(builder.send().await?).await?;
        Ok(())
    }

    // Auth

    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        credentials.validate()?;
        let response: LoginResponse = self
            .send_json(Method::POST, "auth/token/", credentials)
            .await?;
        self.set_token(Some(response.token.clone()));
        info!(username = %response.username, "Logged in");
        Ok(response)
    }

    pub async fn register(&self, registration: &Registration) -> Result<RegisterResponse> {
        registration.validate()?;
        let response: RegisterResponse = self
            .send_json(Method::POST, "auth/register/", registration)
            .await?;
        self.set_token(Some(response.token.clone()));
        info!(username = %response.user.username, "Registered");
        Ok(response)
    }

    /// The local token is dropped even when the server call fails.
    pub async fn logout(&self) -> Result<()> {
        let result = self.send_unit::<()>(Method::POST, "auth/logout/", None).await;
        self.set_token(None);
        result
    }

    // Users

    pub async fn fetch_current_user(&self) -> Result<UserProfile> {
        self.get("users/me/").await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        self.send_json(Method::PUT, "users/update_me/", update).await
    }

    pub async fn follow_user(&self, user_id: UserId) -> Result<()> {
        self.send_unit::<()>(Method::POST, &format!("users/{user_id}/follow/"), None)
            .await
    }

    pub async fn unfollow_user(&self, user_id: UserId) -> Result<()> {
        self.send_unit::<()>(Method::POST, &format!("users/{user_id}/unfollow/"), None)
            .await
    }

    // Tracks

    pub async fn fetch_trending(&self) -> Result<Vec<Track>> {
        self.get_list("tracks/trending/").await
    }

    pub async fn fetch_my_tracks(&self) -> Result<Vec<Track>> {
        self.get_list("tracks/my_tracks/").await
    }

    pub async fn fetch_liked_tracks(&self) -> Result<Vec<Track>> {
        self.get_list("tracks/liked_tracks/").await
    }

    pub async fn search_tracks(&self, query: &str) -> Result<Vec<Track>> {
        let mut url = self.endpoint("tracks/")?;
        url.query_pairs_mut().append_pair("search", query);
        let response = self.request(Method::GET, url).send().await?;
        Ok(Self::parse::<Listing<Track>>(response).await?.into_vec())
    }

    /// Toggles the like. Returns whether the track is liked afterwards:
    /// the backend answers 201 when a like was created and 200 when removed.
    pub async fn like_track(&self, track_id: TrackId) -> Result<bool> {
        let url = self.endpoint(&format!("tracks/{track_id}/like/"))?;
        let response = Self::check(self.request(Method::POST, url).send().await?).await?;
        Ok(response.status() == StatusCode::CREATED)
    }

    pub async fn report_play(&self, track_id: TrackId, interaction: &PlayInteraction) -> Result<()> {
        self.send_unit(Method::POST, &format!("tracks/{track_id}/play/"), Some(interaction))
            .await
    }

    // Recommendations

    pub async fn fetch_for_you(&self) -> Result<Vec<Track>> {
        self.get_list("recommendations/for_you/").await
    }

    pub async fn fetch_recommendations_by_type(&self) -> Result<RecommendationsByType> {
        self.get("recommendations/by_type/").await
    }

    pub async fn fetch_similar_tracks(&self) -> Result<Vec<Track>> {
        self.get_list("recommendations/similar_tracks/").await
    }

    pub async fn fetch_by_genre(&self, genre_id: i64) -> Result<Vec<Track>> {
        let mut url = self.endpoint("recommendations/by_genre/")?;
        url.query_pairs_mut()
            .append_pair("genre_id", &genre_id.to_string());
        let response = self.request(Method::GET, url).send().await?;
        Ok(Self::parse::<Listing<Track>>(response).await?.into_vec())
    }

    pub async fn mark_interaction(
        &self,
        track_id: TrackId,
        interaction_type: InteractionType,
    ) -> Result<()> {
        let body = MarkInteraction {
            track_id,
            interaction_type,
        };
        self.send_unit(Method::POST, "recommendations/mark_interaction/", Some(&body))
            .await
    }

    pub async fn refresh_recommendations(&self) -> Result<String> {
        let response: DetailResponse = self
            .send_json(Method::POST, "recommendations-refresh/", &json!({}))
            .await?;
        Ok(response.detail)
    }

    // Playlists

    pub async fn fetch_my_playlists(&self) -> Result<Vec<Playlist>> {
        self.get_list("playlists/my_playlists/").await
    }

    pub async fn fetch_playlists(&self) -> Result<Vec<Playlist>> {
        self.get_list("playlists/").await
    }

    pub async fn create_playlist(&self, playlist: &NewPlaylist) -> Result<Playlist> {
        self.send_json(Method::POST, "playlists/", playlist).await
    }

    pub async fn add_track_to_playlist(&self, playlist_id: i64, track_id: TrackId) -> Result<()> {
        self.send_unit(
            Method::POST,
            &format!("playlists/{playlist_id}/add_track/"),
            Some(&json!({ "track": track_id })),
        )
        .await
    }

    pub async fn remove_track_from_playlist(
        &self,
        playlist_id: i64,
        track_id: TrackId,
    ) -> Result<()> {
        self.send_unit(
            Method::DELETE,
            &format!("playlists/{playlist_id}/remove_track/"),
            Some(&json!({ "track": track_id })),
        )
        .await
    }

    // Genres

    pub async fn fetch_genres(&self) -> Result<Vec<Genre>> {
        self.get_list("genres/").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_a_trailing_slash() {
        let api = ApiService::with_base_url("http://localhost:8000/api").unwrap();
        assert_eq!(api.base_url().as_str(), "http://localhost:8000/api/");
        assert_eq!(
            api.endpoint("tracks/trending/").unwrap().as_str(),
            "http://localhost:8000/api/tracks/trending/"
        );
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(matches!(
            ApiService::with_base_url("ftp://example.com/api"),
            Err(ApiError::InvalidUrl(_))
        ));
        assert!(ApiService::with_base_url("").is_err());
    }

    #[test]
    fn token_can_be_set_and_cleared() {
        let api = ApiService::with_base_url("http://localhost:8000/api").unwrap();
        assert_eq!(api.token(), None);

        api.set_token(Some("abc".into()));
        assert_eq!(api.token().as_deref(), Some("abc"));

        api.set_token(None);
        assert_eq!(api.token(), None);
    }
}
