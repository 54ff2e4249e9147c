use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::config::AppConfig;
use crate::models::Film;
use crate::utils;

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

const USER_AGENT: &str = "FFFinder/0.1 (+https://github.com/fffinder/fffinder)";
const REQUEST_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, thiserror::Error)]
pub enum TmdbError {
    #[error("tmdb api key is not configured")]
    MissingApiKey,
    #[error("http error: {0}")]
    Http(String),
    #[error("parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TmdbMovie {
    pub id: u64,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<TmdbMovie>,
}

pub fn poster_url(path: &str) -> String {
    format!("{IMAGE_BASE_URL}{path}")
}

type Lookup = Arc<OnceCell<Option<TmdbMovie>>>;

/// Title search against TMDB. Concurrent lookups for the same title share
/// one request and successful answers are kept for the life of the client.
pub struct TmdbClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    lookups: Mutex<HashMap<String, Lookup>>,
}

impl TmdbClient {
    pub fn new(api_key: Option<String>) -> Result<Self, TmdbError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|err| TmdbError::Http(err.to_string()))?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            lookups: Mutex::new(HashMap::new()),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, TmdbError> {
        let client = Self::new(config.tmdb_api_key.clone())?;
        Ok(match config.tmdb_base_url.as_deref() {
            Some(url) if !url.trim().is_empty() => client.with_base_url(url),
            _ => client,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Best match for a title, or `None` when TMDB has nothing.
    pub async fn search_movie(&self, title: &str) -> Result<Option<TmdbMovie>, TmdbError> {
        let api_key = self.api_key.as_deref().ok_or(TmdbError::MissingApiKey)?;
        let title = utils::clean_text(title);
        if title.is_empty() {
            return Ok(None);
        }

        let key = title.to_lowercase();
        let cell = {
            let mut lookups = self.lookups.lock().unwrap_or_else(PoisonError::into_inner);
            lookups.entry(key.clone()).or_default().clone()
        };

        match cell
            .get_or_try_init(|| self.fetch_first_match(api_key, &title))
            .await
        {
            Ok(movie) => Ok(movie.clone()),
            Err(err) => {
                self.forget_failed(&key, &cell);
                Err(err)
            }
        }
    }

    /// Drops a lookup that never completed so failed titles don't pile up.
    fn forget_failed(&self, key: &str, cell: &Lookup) {
        let mut lookups = self.lookups.lock().unwrap_or_else(PoisonError::into_inner);
        let stale = lookups
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, cell) && !current.initialized());
        if stale {
            lookups.remove(key);
        }
    }

    #[cfg(test)]
    fn cached_titles(&self) -> usize {
        self.lookups.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    async fn fetch_first_match(
        &self,
        api_key: &str,
        title: &str,
    ) -> Result<Option<TmdbMovie>, TmdbError> {
        let mut url = Url::parse(&format!("{}/search/movie", self.base_url))
            .map_err(|err| TmdbError::Http(err.to_string()))?;
        url.query_pairs_mut()
            .append_pair("api_key", api_key)
            .append_pair("query", title);

        tracing::debug!(title, "tmdb search");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| TmdbError::Http(err.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| TmdbError::Http(err.to_string()))?;

        if !status.is_success() {
            return Err(TmdbError::Http(format!("status {}: {}", status, text)));
        }

        let payload: SearchResponse =
            serde_json::from_str(&text).map_err(|err| TmdbError::Parse(err.to_string()))?;
        Ok(payload.results.into_iter().next())
    }

    /// Fills in the remote poster path. Any failure leaves the film as it was.
    pub async fn enrich_film(&self, mut film: Film) -> Film {
        if film.external_poster_path.is_some() {
            return film;
        }
        match self.search_movie(&film.title).await {
            Ok(Some(movie)) => match movie.poster_path {
                Some(path) if !path.trim().is_empty() => {
                    tracing::debug!(title = %film.title, tmdb_id = movie.id, "poster found");
                    film.external_poster_path = Some(path);
                }
                _ => tracing::debug!(title = %film.title, "tmdb match has no poster"),
            },
            Ok(None) => tracing::debug!(title = %film.title, "no tmdb match"),
            Err(err) => tracing::warn!(title = %film.title, %err, "tmdb lookup failed"),
        }
        film
    }

    pub async fn enrich_films(&self, films: Vec<Film>) -> Vec<Film> {
        let mut enriched = Vec::with_capacity(films.len());
        for film in films {
            enriched.push(self.enrich_film(film).await);
        }
        enriched
    }
}
