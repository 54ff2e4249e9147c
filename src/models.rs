use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::tmdb;

const ID_HEX_LEN: usize = 16;

/// Stable hash over the identifying fields of a record: `a|b|c`.
fn stable_id(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for (index, part) in parts.iter().enumerate() {
        if index > 0 {
            hasher.update(b"|");
        }
        hasher.update(part.as_bytes());
    }
    let digest = format!("{:x}", hasher.finalize());
    digest[..ID_HEX_LEN].to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FestivalId(String);

impl FestivalId {
    pub fn for_name(name: &str) -> Self {
        Self(stable_id(&["festival", name.trim()]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FestivalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Film identity is title, year and director, so a film featured by two
/// festivals carries the same id under both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilmId(String);

impl FilmId {
    pub fn for_film(title: &str, year: i32, director: &str) -> Self {
        Self(stable_id(&[
            "film",
            title.trim(),
            &year.to_string(),
            director.trim(),
        ]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FilmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Festival {
    pub id: FestivalId,
    pub name: String,
    pub date_range: String,
    pub description: String,
    pub website: String,
    pub location: String,
    pub established: i32,
    pub image: Option<String>,
    pub genres: Vec<String>,
    pub ticket_price: Option<String>,
    pub history: String,
    pub address: String,
    pub featured_films: Vec<Film>,
}

impl Festival {
    pub fn new(name: impl Into<String>, date_range: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: FestivalId::for_name(&name),
            name,
            date_range: date_range.into(),
            description: String::new(),
            website: String::new(),
            location: String::new(),
            established: 0,
            image: None,
            genres: Vec::new(),
            ticket_price: None,
            history: String::new(),
            address: String::new(),
            featured_films: Vec::new(),
        }
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_featured_films(mut self, films: Vec<Film>) -> Self {
        self.featured_films = films;
        self
    }

    pub fn with_established(mut self, year: i32) -> Self {
        self.established = year;
        self
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|tag| tag == genre)
    }
}

/// Outbound links to the three external film catalogs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalLinks {
    pub imdb: String,
    pub letterboxd: String,
    pub rotten_tomatoes: String,
}

impl ExternalLinks {
    /// Search pages for a title, used when no direct link is known.
    pub fn search_for(title: &str) -> Self {
        let query = title.trim();
        let encode = |base: &str, key: &str| {
            reqwest::Url::parse_with_params(base, [(key, query)])
                .map(String::from)
                .unwrap_or_else(|_| base.to_string())
        };
        Self {
            imdb: encode("https://www.imdb.com/find/", "q"),
            letterboxd: encode("https://letterboxd.com/search/", "q"),
            rotten_tomatoes: encode("https://www.rottentomatoes.com/search", "search"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Award {
    pub title: String,
    pub year: i32,
    /// Festival name, matched exactly against the catalog.
    pub festival: String,
    pub festival_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Film {
    pub id: FilmId,
    pub title: String,
    pub year: i32,
    pub director: String,
    pub description: String,
    /// Bundled poster asset name.
    pub poster: Option<String>,
    /// TMDB poster path, filled in lazily by the metadata client.
    pub external_poster_path: Option<String>,
    pub links: ExternalLinks,
    pub awards: Vec<Award>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PosterSource {
    Remote(String),
    Asset(String),
}

impl Film {
    pub fn new(title: impl Into<String>, year: i32, director: impl Into<String>) -> Self {
        let title = title.into();
        let director = director.into();
        Self {
            id: FilmId::for_film(&title, year, &director),
            links: ExternalLinks::search_for(&title),
            title,
            year,
            director,
            description: String::new(),
            poster: None,
            external_poster_path: None,
            awards: Vec::new(),
        }
    }

    pub fn with_awards(mut self, awards: Vec<Award>) -> Self {
        self.awards = awards;
        self
    }

    /// Remote poster wins over the bundled asset.
    pub fn poster_source(&self) -> Option<PosterSource> {
        if let Some(path) = self
            .external_poster_path
            .as_deref()
            .filter(|path| !path.trim().is_empty())
        {
            return Some(PosterSource::Remote(tmdb::poster_url(path)));
        }
        self.poster.clone().map(PosterSource::Asset)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: u64,
    pub title: String,
    pub message: String,
    pub time: String,
    pub is_read: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FaqEntry {
    pub question: &'static str,
    pub answer: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn film_id_ignores_owning_festival() {
        let a = Film::new("The Last Dance", 2022, "Emma Wilson");
        let b = Film::new("The Last Dance", 2022, "Emma Wilson");
        let c = Film::new("The Last Dance", 2023, "Alex Chen");
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
        assert_eq!(a.id.as_str().len(), ID_HEX_LEN);
    }

    #[test]
    fn remote_poster_preferred_over_asset() {
        let mut film = Film::new("Shiva Baby", 2020, "Emma Seligman");
        assert_eq!(film.poster_source(), None);

        film.poster = Some("shiva_baby_poster".to_string());
        assert_eq!(
            film.poster_source(),
            Some(PosterSource::Asset("shiva_baby_poster".to_string()))
        );

        film.external_poster_path = Some("/abc.jpg".to_string());
        assert_eq!(
            film.poster_source(),
            Some(PosterSource::Remote(
                "https://image.tmdb.org/t/p/w500/abc.jpg".to_string()
            ))
        );
    }

    #[test]
    fn search_links_are_always_present() {
        let links = ExternalLinks::search_for("Tokyo Stories");
        assert!(links.imdb.starts_with("https://www.imdb.com/find/?q=Tokyo"));
        assert!(links.letterboxd.contains("letterboxd.com"));
        assert!(links.rotten_tomatoes.contains("search=Tokyo"));
    }
}
