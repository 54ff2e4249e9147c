use std::collections::HashSet;

use crate::catalog::Catalog;
use crate::models::{Festival, FestivalId, Film, FilmId};
use crate::notifications::NotificationLog;

pub const FESTIVAL_SAVED_TITLE: &str = "Festival Saved";

/// Session-scoped favorite sets. Nothing here is persisted.
#[derive(Debug, Default, Clone)]
pub struct Favorites {
    festivals: HashSet<FestivalId>,
    films: HashSet<FilmId>,
}

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or removes a festival and returns the new membership. Only an
    /// addition writes to the log. Ids missing from the catalog are ignored.
    pub fn toggle_festival(
        &mut self,
        catalog: &Catalog,
        id: &FestivalId,
        log: &mut NotificationLog,
    ) -> bool {
        if self.festivals.remove(id) {
            tracing::info!(festival = %id, "festival removed from favorites");
            return false;
        }
        let Some(festival) = catalog.find_festival(id) else {
            tracing::warn!(festival = %id, "toggle for unknown festival ignored");
            return false;
        };
        self.festivals.insert(id.clone());
        tracing::info!(festival = %festival.name, "festival added to favorites");
        log.add(
            FESTIVAL_SAVED_TITLE,
            format!("{} has been added to your favorites.", festival.name),
        );
        true
    }

    /// Same as festivals, without a notification.
    pub fn toggle_film(&mut self, catalog: &Catalog, id: &FilmId) -> bool {
        if self.films.remove(id) {
            tracing::info!(film = %id, "film removed from favorites");
            return false;
        }
        if catalog.find_film(id).is_none() {
            tracing::warn!(film = %id, "toggle for unknown film ignored");
            return false;
        }
        self.films.insert(id.clone());
        tracing::info!(film = %id, "film added to favorites");
        true
    }

    pub fn is_festival_favorite(&self, id: &FestivalId) -> bool {
        self.festivals.contains(id)
    }

    pub fn is_film_favorite(&self, id: &FilmId) -> bool {
        self.films.contains(id)
    }

    pub fn has_favorites(&self) -> bool {
        !self.festivals.is_empty() || !self.films.is_empty()
    }

    /// Catalog order.
    pub fn favorite_festivals<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Festival> {
        catalog
            .all_festivals()
            .iter()
            .filter(|festival| self.festivals.contains(&festival.id))
            .collect()
    }

    /// Festival order, then featured order; a film featured by several
    /// festivals is listed once, at its first occurrence.
    pub fn favorite_films<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Film> {
        let mut seen = HashSet::new();
        catalog
            .all_films()
            .filter(|film| self.films.contains(&film.id))
            .filter(|film| seen.insert(film.id.clone()))
            .collect()
    }
}
