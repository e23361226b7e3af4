use std::{path::PathBuf, time::Duration};

use color_eyre::eyre::{Context, eyre};
use directories::ProjectDirs;
use url::Url;

use crate::audio::config::AudioConfig;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: Url,
    /// Origin that relative media paths (`/media/tracks/...`) are resolved against.
    pub media_origin: Url,
    pub data_dir: PathBuf,
    pub search_debounce: Duration,
    pub audio: AudioConfig,
}

impl AppConfig {
    pub fn from_env() -> color_eyre::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> color_eyre::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_api_url = lookup("MUSREC_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(&raw_api_url)
            .wrap_err_with(|| format!("invalid MUSREC_API_URL: {raw_api_url}"))?;

        let media_origin = match lookup("MUSREC_MEDIA_ORIGIN") {
            Some(origin) => Url::parse(&origin)
                .wrap_err_with(|| format!("invalid MUSREC_MEDIA_ORIGIN: {origin}"))?,
            None => origin_of(&api_url),
        };

        let data_dir = match lookup("MUSREC_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };

        let search_debounce = lookup("MUSREC_SEARCH_DEBOUNCE_MS")
            .map(|ms| ms.parse::<u64>())
            .transpose()
            .wrap_err("invalid MUSREC_SEARCH_DEBOUNCE_MS")?
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_SEARCH_DEBOUNCE);

        Ok(Self {
            api_url,
            media_origin,
            data_dir,
            search_debounce,
            audio: AudioConfig::default(),
        })
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.data_dir.join("storage")
    }
}

fn origin_of(url: &Url) -> Url {
    let mut origin = url.clone();
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);
    origin
}

fn default_data_dir() -> color_eyre::Result<PathBuf> {
    ProjectDirs::from("", "", "musrec")
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .ok_or_else(|| eyre!("could not determine a data directory, set MUSREC_DATA_DIR"))
}
