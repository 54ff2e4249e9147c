pub mod catalog;
pub mod config;
pub mod dates;
pub mod favorites;
pub mod models;
pub mod notifications;
pub mod search;
pub mod state;
pub mod tmdb;
mod utils;

use anyhow::Context;
use chrono::Datelike;
use tracing_subscriber::EnvFilter;

pub use catalog::{AwardTarget, Catalog};
pub use config::{AppConfig, ConfigStore};
pub use dates::{Clock, Countdown, DateRange, DateRangeParser, FixedClock, SystemClock};
pub use favorites::Favorites;
pub use models::{Award, ExternalLinks, Festival, FestivalId, Film, FilmId, Notification};
pub use notifications::NotificationLog;
pub use search::{FestivalQuery, FilmQuery, SearchResults, SortKey};
pub use state::AppState;
pub use tmdb::{TmdbClient, TmdbError, TmdbMovie};

const DEFAULT_LOG_FILTER: &str = "fffinder=info,fffinder_lib=info";

/// Installs the fmt subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Prints the festival overview, backfilling posters for the featured films
/// when a TMDB key is configured.
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    let config_store = ConfigStore::load();
    let config = config_store.read().with_env_overrides();
    tracing::info!(path = %config_store.path().display(), tz = %config.timezone(), "config loaded");

    let state = AppState::from_config(&config);
    for issue in state.catalog().validate(state.dates().now().year()) {
        tracing::warn!(?issue, "catalog issue");
    }

    println!("FILM FESTIVALS");
    for festival in state.all_festivals() {
        let range = state.date_range(festival);
        let status = if state.is_upcoming(festival) {
            format!(
                "in {} days ({:?})",
                state.days_until_start(festival),
                state.countdown(festival)
            )
        } else {
            "finished".to_string()
        };
        println!(
            "  {:<45} {} - {}  {}",
            festival.name,
            range.start.format("%e %b %Y"),
            range.end.format("%e %b %Y"),
            status
        );
    }

    let upcoming = state.featured_festivals();
    if upcoming.is_empty() {
        println!("No upcoming festivals.");
    } else {
        println!("Coming up:");
        for festival in upcoming {
            println!("  {} ({})", festival.name, festival.date_range);
        }
    }

    let client = TmdbClient::from_config(&config).context("failed to build tmdb client")?;
    if !client.has_api_key() {
        tracing::info!("no TMDB_API_KEY set, skipping poster lookup");
        return Ok(());
    }

    let top: Vec<Film> = state.featured_films().into_iter().take(5).cloned().collect();
    println!("Featured films:");
    for film in client.enrich_films(top).await {
        let poster = match film.poster_source() {
            Some(models::PosterSource::Remote(url)) => url,
            Some(models::PosterSource::Asset(name)) => format!("asset:{name}"),
            None => "no poster".to_string(),
        };
        println!("  {} ({}) {}", film.title, film.year, poster);
    }

    Ok(())
}
