//! The bundled, read-only festival catalog.

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::models::{Award, ExternalLinks, FaqEntry, Festival, FestivalId, Film, FilmId};

const BUNDLED_JSON: &str = include_str!("../data/catalog.json");

static BUNDLED: Lazy<Catalog> = Lazy::new(|| {
    Catalog::from_json(BUNDLED_JSON).unwrap_or_else(|err| {
        tracing::error!(%err, "bundled catalog is malformed");
        Catalog::default()
    })
});

static FAQ: [FaqEntry; 3] = [
    FaqEntry {
        question: "How do I add a festival to Favorites?",
        answer: "Tap the heart icon on the festival detail page.",
    },
    FaqEntry {
        question: "Can I search by genre?",
        answer: "Yes, use the filter options to narrow down your results by genre.",
    },
    FaqEntry {
        question: "How can I view more details about a festival?",
        answer: "Tap on any festival card or list item to view its full description and featured films.",
    },
];

#[derive(Debug, Deserialize)]
struct CatalogDoc {
    festivals: Vec<FestivalDoc>,
}

#[derive(Debug, Deserialize)]
struct FestivalDoc {
    name: String,
    date_range: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    website: String,
    #[serde(default)]
    location: String,
    established: i32,
    image: Option<String>,
    #[serde(default)]
    genres: Vec<String>,
    ticket_price: Option<String>,
    #[serde(default)]
    history: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    featured_films: Vec<FilmDoc>,
}

#[derive(Debug, Deserialize)]
struct FilmDoc {
    title: String,
    year: i32,
    director: String,
    #[serde(default)]
    description: String,
    poster: Option<String>,
    links: Option<ExternalLinks>,
    #[serde(default)]
    awards: Vec<Award>,
}

impl From<FilmDoc> for Film {
    fn from(doc: FilmDoc) -> Self {
        let links = doc
            .links
            .unwrap_or_else(|| ExternalLinks::search_for(&doc.title));
        Film {
            id: FilmId::for_film(&doc.title, doc.year, &doc.director),
            title: doc.title,
            year: doc.year,
            director: doc.director,
            description: doc.description,
            poster: doc.poster,
            external_poster_path: None,
            links,
            awards: doc.awards,
        }
    }
}

impl From<FestivalDoc> for Festival {
    fn from(doc: FestivalDoc) -> Self {
        Festival {
            id: FestivalId::for_name(&doc.name),
            name: doc.name,
            date_range: doc.date_range,
            description: doc.description,
            website: doc.website,
            location: doc.location,
            established: doc.established,
            image: doc.image,
            genres: doc.genres,
            ticket_price: doc.ticket_price,
            history: doc.history,
            address: doc.address,
            featured_films: doc.featured_films.into_iter().map(Film::from).collect(),
        }
    }
}

/// Where an award links to: the festival's own page when the name resolves,
/// otherwise the festival website.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AwardTarget<'a> {
    Festival(&'a Festival),
    External(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogIssue {
    EmptyName { index: usize },
    ImplausibleEstablished { festival: String, year: i32 },
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    festivals: Vec<Festival>,
}

impl Catalog {
    pub fn new(festivals: Vec<Festival>) -> Self {
        Self { festivals }
    }

    /// The compiled-in sample catalog, parsed once per process.
    pub fn bundled() -> &'static Catalog {
        &BUNDLED
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let doc: CatalogDoc = serde_json::from_str(json)?;
        let festivals: Vec<Festival> = doc.festivals.into_iter().map(Festival::from).collect();
        tracing::debug!(festivals = festivals.len(), "catalog loaded");
        Ok(Self::new(festivals))
    }

    pub fn all_festivals(&self) -> &[Festival] {
        &self.festivals
    }

    /// First exact, case-sensitive match.
    pub fn find_festival_by_name(&self, name: &str) -> Option<&Festival> {
        self.festivals.iter().find(|festival| festival.name == name)
    }

    pub fn find_festival(&self, id: &FestivalId) -> Option<&Festival> {
        self.festivals.iter().find(|festival| &festival.id == id)
    }

    pub fn find_film(&self, id: &FilmId) -> Option<&Film> {
        self.all_films().find(|film| &film.id == id)
    }

    /// Featured films in festival order, then featured order.
    pub fn all_films(&self) -> impl Iterator<Item = &Film> + '_ {
        self.festivals
            .iter()
            .flat_map(|festival| festival.featured_films.iter())
    }

    pub fn award_target<'a>(&'a self, award: &'a Award) -> AwardTarget<'a> {
        match self.find_festival_by_name(&award.festival) {
            Some(festival) => AwardTarget::Festival(festival),
            None => {
                tracing::debug!(festival = %award.festival, "award festival not in catalog");
                AwardTarget::External(&award.festival_url)
            }
        }
    }

    pub fn faq(&self) -> &'static [FaqEntry] {
        &FAQ
    }

    /// Reports data problems without rejecting the catalog.
    pub fn validate(&self, current_year: i32) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();
        for (index, festival) in self.festivals.iter().enumerate() {
            if festival.name.trim().is_empty() {
                issues.push(CatalogIssue::EmptyName { index });
            }
            if !(1000..=current_year).contains(&festival.established) {
                issues.push(CatalogIssue::ImplausibleEstablished {
                    festival: festival.name.clone(),
                    year: festival.established,
                });
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_parses() {
        let catalog = Catalog::from_json(BUNDLED_JSON).expect("bundled catalog");
        assert_eq!(catalog.all_festivals().len(), 11);
        assert_eq!(catalog.all_festivals()[0].name, "Sydney Film Festival");
        assert_eq!(catalog.all_films().count(), 54);
        assert!(catalog.validate(2025).is_empty());
    }

    #[test]
    fn find_by_name_is_exact() {
        let catalog = Catalog::bundled();
        let flickerfest = catalog
            .find_festival_by_name("Flickerfest")
            .expect("flickerfest present");
        assert_eq!(flickerfest.genres, vec!["Short Films".to_string()]);
        assert!(catalog.find_festival_by_name("flickerfest").is_none());
        assert!(catalog.find_festival_by_name("Cannes").is_none());
    }

    #[test]
    fn lookups_by_id() {
        let catalog = Catalog::bundled();
        let festival = &catalog.all_festivals()[2];
        assert_eq!(catalog.find_festival(&festival.id), Some(festival));

        let film = &festival.featured_films[0];
        assert_eq!(catalog.find_film(&film.id), Some(film));
    }

    #[test]
    fn award_target_falls_back_to_url() {
        let catalog = Catalog::bundled();
        let known = Award {
            title: "Sydney Film Prize".to_string(),
            year: 2023,
            festival: "Sydney Film Festival".to_string(),
            festival_url: "https://www.sff.org.au".to_string(),
        };
        match catalog.award_target(&known) {
            AwardTarget::Festival(festival) => assert_eq!(festival.name, "Sydney Film Festival"),
            other => panic!("expected festival target, got {other:?}"),
        }

        let unknown = Award {
            festival: "Melbourne International Film Festival".to_string(),
            festival_url: "https://miff.com.au".to_string(),
            ..known
        };
        assert_eq!(
            catalog.award_target(&unknown),
            AwardTarget::External("https://miff.com.au")
        );
    }

    #[test]
    fn validate_reports_bad_rows() {
        let catalog = Catalog::new(vec![
            Festival::new("", "June 1-2, 2025").with_established(1990),
            Festival::new("Future Fest", "June 1-2, 2025").with_established(2999),
        ]);
        assert_eq!(
            catalog.validate(2025),
            vec![
                CatalogIssue::EmptyName { index: 0 },
                CatalogIssue::ImplausibleEstablished {
                    festival: "Future Fest".to_string(),
                    year: 2999,
                },
            ]
        );
    }

    #[test]
    fn faq_has_three_entries() {
        let faq = Catalog::bundled().faq();
        assert_eq!(faq.len(), 3);
        assert!(faq[1].question.contains("genre"));
    }
}
