use std::sync::Arc;

use chrono_tz::Tz;

use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::dates::{Clock, Countdown, DateRange, DateRangeParser, SystemClock};
use crate::favorites::Favorites;
use crate::models::{Festival, FestivalId, Film, FilmId, Notification};
use crate::notifications::NotificationLog;
use crate::search::{self, FestivalQuery, FilmQuery, SearchResults, FEATURED_FESTIVAL_LIMIT};

/// View state for one UI session: the catalog plus everything the user can
/// change. Owned by the UI thread and passed by reference.
#[derive(Debug)]
pub struct AppState {
    catalog: Catalog,
    dates: DateRangeParser,
    favorites: Favorites,
    notifications: NotificationLog,
}

impl AppState {
    pub fn new(catalog: Catalog, tz: Tz, clock: Arc<dyn Clock>, timestamp_format: &str) -> Self {
        Self {
            dates: DateRangeParser::new(tz, clock.clone()),
            notifications: NotificationLog::seeded(clock, tz, timestamp_format),
            favorites: Favorites::new(),
            catalog,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Catalog::bundled().clone(),
            config.timezone(),
            Arc::new(SystemClock),
            config.timestamp_format(),
        )
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn dates(&self) -> &DateRangeParser {
        &self.dates
    }

    pub fn all_festivals(&self) -> &[Festival] {
        self.catalog.all_festivals()
    }

    pub fn find_festival_by_name(&self, name: &str) -> Option<&Festival> {
        self.catalog.find_festival_by_name(name)
    }

    // dates

    pub fn date_range(&self, festival: &Festival) -> DateRange {
        self.dates.parse(&festival.date_range)
    }

    pub fn is_upcoming(&self, festival: &Festival) -> bool {
        self.dates.is_upcoming(&festival.date_range)
    }

    pub fn days_until_start(&self, festival: &Festival) -> i64 {
        self.dates.days_until_start(&festival.date_range)
    }

    pub fn countdown(&self, festival: &Festival) -> Countdown {
        self.dates.countdown(&festival.date_range)
    }

    // favorites

    pub fn toggle_festival_favorite(&mut self, id: &FestivalId) -> bool {
        self.favorites.toggle_festival(&self.catalog, id, &mut self.notifications)
    }

    pub fn toggle_film_favorite(&mut self, id: &FilmId) -> bool {
        self.favorites.toggle_film(&self.catalog, id)
    }

    pub fn is_festival_favorite(&self, id: &FestivalId) -> bool {
        self.favorites.is_festival_favorite(id)
    }

    pub fn is_film_favorite(&self, id: &FilmId) -> bool {
        self.favorites.is_film_favorite(id)
    }

    pub fn has_favorites(&self) -> bool {
        self.favorites.has_favorites()
    }

    pub fn favorite_festivals(&self) -> Vec<&Festival> {
        self.favorites.favorite_festivals(&self.catalog)
    }

    pub fn favorite_films(&self) -> Vec<&Film> {
        self.favorites.favorite_films(&self.catalog)
    }

    // search

    pub fn search_festivals(&self, query: &FestivalQuery) -> SearchResults<'_, Festival> {
        search::search_festivals(self.catalog.all_festivals(), query, &self.dates)
    }

    pub fn search_films(&self, query: &FilmQuery) -> SearchResults<'_, Film> {
        search::search_films(self.catalog.all_films(), query)
    }

    pub fn available_genres(&self) -> Vec<String> {
        search::available_genres(self.catalog.all_festivals())
    }

    pub fn upcoming_festivals(&self) -> Vec<&Festival> {
        search::upcoming_festivals(self.catalog.all_festivals(), &self.dates)
    }

    pub fn featured_festivals(&self) -> Vec<&Festival> {
        search::featured_festivals(
            self.catalog.all_festivals(),
            &self.dates,
            FEATURED_FESTIVAL_LIMIT,
        )
    }

    pub fn featured_films(&self) -> Vec<&Film> {
        search::featured_films(self.catalog.all_festivals())
    }

    // notifications

    pub fn notifications(&self) -> &[Notification] {
        self.notifications.entries()
    }

    pub fn unread_notifications(&self) -> usize {
        self.notifications.unread_count()
    }

    pub fn add_notification(&mut self, title: &str, message: &str) -> u64 {
        self.notifications.add(title, message)
    }

    pub fn mark_notification_read(&mut self, id: u64) -> bool {
        self.notifications.mark_read(id)
    }

    pub fn mark_all_notifications_read(&mut self) {
        self.notifications.mark_all_read();
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::config::DEFAULT_TIMESTAMP_FORMAT;
    use crate::dates::{FixedClock, DEFAULT_TIMEZONE};

    fn state() -> AppState {
        let now = Utc
            .with_ymd_and_hms(2025, 2, 1, 0, 0, 0)
            .single()
            .expect("valid time");
        AppState::new(
            Catalog::bundled().clone(),
            DEFAULT_TIMEZONE,
            Arc::new(FixedClock(now)),
            DEFAULT_TIMESTAMP_FORMAT,
        )
    }

    #[test]
    fn festival_favorite_notifies_once_per_addition() {
        let mut state = state();
        let id = state
            .find_festival_by_name("Sydney Film Festival")
            .map(|f| f.id.clone())
            .expect("festival");
        let before = state.notifications().len();

        assert!(state.toggle_festival_favorite(&id));
        assert_eq!(state.notifications().len(), before + 1);
        assert_eq!(state.favorite_festivals().len(), 1);

        let snapshot = state.notifications().to_vec();
        assert!(!state.toggle_festival_favorite(&id));
        assert_eq!(state.notifications(), snapshot.as_slice());
        assert!(state.favorite_festivals().is_empty());
    }

    #[test]
    fn home_lists_use_the_injected_clock() {
        let state = state();
        let featured = state.featured_festivals();
        assert_eq!(featured.len(), FEATURED_FESTIVAL_LIMIT);
        // Mardi Gras and Europa! both start February 13
        assert_eq!(featured[0].name, "Queer Screen Mardi Gras Film Festival");
        assert_eq!(featured[1].name, "Europa! Europa Film Festival");
        assert!(state.upcoming_festivals().iter().all(|f| state.is_upcoming(f)));
        assert_eq!(state.featured_films().len(), 54);
    }

    #[test]
    fn notification_badge_tracks_reads() {
        let mut state = state();
        let id = state.add_notification("Reminder", "Flickerfest starts soon.");
        assert_eq!(state.unread_notifications(), 2);
        assert!(state.mark_notification_read(id));
        assert_eq!(state.unread_notifications(), 1);
        state.mark_all_notifications_read();
        assert_eq!(state.unread_notifications(), 0);
    }
}
