//! Derived, display-ready views of the catalog: text and genre filters,
//! sorting, genre aggregation and the home screen lists.

use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dates::DateRangeParser;
use crate::models::{Festival, Film};

pub const DISALLOWED_QUERY_CHARS: [char; 8] = [';', '\\', '/', '`', '\'', '"', '<', '>'];
pub const INVALID_QUERY_WARNING: &str =
    "Search can't contain special characters like ; \\ / ` ' \" < >";
pub const FEATURED_FESTIVAL_LIMIT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Name,
    Date,
    Popularity,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::Name, SortKey::Date, SortKey::Popularity];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Name => "Name",
            SortKey::Date => "Date",
            SortKey::Popularity => "Popularity",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown sort key: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryValidity {
    Empty,
    Valid,
    Invalid { offending: char },
}

pub fn validate_query(text: &str) -> QueryValidity {
    if text.trim().is_empty() {
        return QueryValidity::Empty;
    }
    match text.chars().find(|c| DISALLOWED_QUERY_CHARS.contains(c)) {
        Some(offending) => QueryValidity::Invalid { offending },
        None => QueryValidity::Valid,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FestivalQuery {
    pub text: String,
    pub genre: Option<String>,
    pub sort: Option<SortKey>,
    /// Reject special characters instead of matching them.
    pub strict: bool,
}

impl FestivalQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn sorted_by(mut self, key: SortKey) -> Self {
        self.sort = Some(key);
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilmQuery {
    pub text: String,
    pub sort: Option<SortKey>,
    pub strict: bool,
}

impl FilmQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn sorted_by(mut self, key: SortKey) -> Self {
        self.sort = Some(key);
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults<'a, T> {
    pub items: Vec<&'a T>,
    /// Set when the query was rejected and text filtering skipped.
    pub warning: Option<&'static str>,
}

impl<'a, T> SearchResults<'a, T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Lower-cased needle, or `None` when no text filter applies.
fn text_filter(text: &str, strict: bool) -> (Option<String>, Option<&'static str>) {
    match validate_query(text) {
        QueryValidity::Empty => (None, None),
        QueryValidity::Invalid { offending } if strict => {
            tracing::debug!(%offending, "rejected search query");
            (None, Some(INVALID_QUERY_WARNING))
        }
        _ => (Some(text.to_lowercase()), None),
    }
}

pub fn search_festivals<'a>(
    festivals: &'a [Festival],
    query: &FestivalQuery,
    dates: &DateRangeParser,
) -> SearchResults<'a, Festival> {
    let (needle, warning) = text_filter(&query.text, query.strict);

    let mut items: Vec<&Festival> = festivals
        .iter()
        .filter(|festival| match &needle {
            Some(needle) => festival.name.to_lowercase().contains(needle),
            None => true,
        })
        .filter(|festival| match &query.genre {
            Some(genre) => festival.has_genre(genre),
            None => true,
        })
        .collect();

    if let Some(key) = query.sort {
        sort_festivals(&mut items, key, dates);
    }

    SearchResults { items, warning }
}

pub fn sort_festivals(items: &mut [&Festival], key: SortKey, dates: &DateRangeParser) {
    match key {
        SortKey::Name => items.sort_by(|a, b| a.name.cmp(&b.name)),
        SortKey::Date => {
            items.sort_by_cached_key(|festival| dates.parse(&festival.date_range).start)
        }
        SortKey::Popularity => items.sort_by_key(|festival| Reverse(festival.featured_films.len())),
    }
}

pub fn search_films<'a, I>(films: I, query: &FilmQuery) -> SearchResults<'a, Film>
where
    I: IntoIterator<Item = &'a Film>,
{
    let (needle, warning) = text_filter(&query.text, query.strict);

    let mut items: Vec<&Film> = films
        .into_iter()
        .filter(|film| match &needle {
            Some(needle) => {
                film.title.to_lowercase().contains(needle)
                    || film.director.to_lowercase().contains(needle)
            }
            None => true,
        })
        .collect();

    if let Some(key) = query.sort {
        sort_films(&mut items, key);
    }

    SearchResults { items, warning }
}

pub fn sort_films(items: &mut [&Film], key: SortKey) {
    match key {
        SortKey::Name => items.sort_by(|a, b| a.title.cmp(&b.title)),
        SortKey::Date => items.sort_by_key(|film| Reverse(film.year)),
        SortKey::Popularity => items.sort_by_key(|film| Reverse(film.awards.len())),
    }
}

/// Sorted union of every festival's genre tags.
pub fn available_genres(festivals: &[Festival]) -> Vec<String> {
    festivals
        .iter()
        .flat_map(|festival| festival.genres.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Festivals starting now or later, soonest first.
pub fn upcoming_festivals<'a>(
    festivals: &'a [Festival],
    dates: &DateRangeParser,
) -> Vec<&'a Festival> {
    let now = dates.now();
    let mut upcoming: Vec<(&Festival, _)> = festivals
        .iter()
        .map(|festival| (festival, dates.parse(&festival.date_range).start))
        .filter(|(_, start)| *start >= now)
        .collect();
    upcoming.sort_by_key(|(_, start)| *start);
    upcoming.into_iter().map(|(festival, _)| festival).collect()
}

pub fn featured_festivals<'a>(
    festivals: &'a [Festival],
    dates: &DateRangeParser,
    limit: usize,
) -> Vec<&'a Festival> {
    let mut upcoming = upcoming_festivals(festivals, dates);
    upcoming.truncate(limit);
    upcoming
}

/// Every featured film, most awarded first.
pub fn featured_films(festivals: &[Festival]) -> Vec<&Film> {
    let mut films: Vec<&Film> = festivals
        .iter()
        .flat_map(|festival| festival.featured_films.iter())
        .collect();
    sort_films(&mut films, SortKey::Popularity);
    films
}
