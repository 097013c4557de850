// src/app/catalog/mod.rs
//! Remote movie catalog: title search, credits and poster bytes.
//!
//! [`CatalogApi`] is the raw transport (one request per call). [`MetadataClient`]
//! sits on top of it and owns the query cleanup, the single year-less retry and
//! a session memo so repeated lookups stay local.

pub mod genres;
pub mod tmdb;

use std::sync::Arc;

use itertools::Itertools;
use serde::Deserialize;
use tracing::{debug, info};

use crate::app::cache::{BoundedCache, SharedCache};
use crate::app::data::{clamp_rating, Movie, MovieDraft};
use crate::app::error::LookupError;
use crate::app::utils::{clean_search_title, extract_year, normalize_year_hint};

pub use self::tmdb::TmdbApi;

pub const DEFAULT_CAST_LIMIT: usize = 5;
const SEARCH_MEMO: usize = 256;
const CREDITS_MEMO: usize = 512;
const IMAGE_MEMO: usize = 128;

/// One candidate from a title search, as the service returns it.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchHit {
    pub id: u64,
    pub title: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
    pub genre_ids: Vec<u32>,
    pub poster_path: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawCredits {
    pub cast: Vec<RawCast>,
    pub crew: Vec<RawCrew>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawCast {
    pub name: String,
    pub character: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawCrew {
    pub name: String,
    pub job: Option<String>,
}

/// Raw transport to the catalog service.
pub trait CatalogApi: Send + Sync {
    fn search_movies(&self, query: &str, year: Option<&str>) -> Result<Vec<SearchHit>, LookupError>;
    fn movie_credits(&self, tmdb_id: u64) -> Result<RawCredits, LookupError>;
    fn poster_bytes(&self, poster_path: &str) -> Result<Vec<u8>, LookupError>;
}

/// Anything that can hand out raw poster bytes by identifier.
pub trait ImageSource: Send + Sync {
    fn image_bytes(&self, poster_path: &str) -> Result<Arc<[u8]>, LookupError>;
}

/// Best search result, already shaped like a record.
#[derive(Clone, Debug, PartialEq)]
pub struct MovieMatch {
    pub title: String,
    pub year: String,
    pub genre: String,
    pub rating: f32,
    pub poster_path: String,
    pub tmdb_id: Option<u64>,
}

impl MovieMatch {
    fn from_hit(hit: SearchHit, query: &str) -> Self {
        let title = hit
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| query.to_string());
        let year = hit
            .release_date
            .unwrap_or_default()
            .chars()
            .take(4)
            .collect();
        let genre = hit
            .genre_ids
            .iter()
            .take(3)
            .map(|&id| genres::genre_name(id))
            .join(", ");
        Self {
            title,
            year,
            genre,
            rating: clamp_rating(hit.vote_average.unwrap_or(0.0) as f32),
            poster_path: hit.poster_path.unwrap_or_default(),
            tmdb_id: Some(hit.id).filter(|&id| id > 0),
        }
    }

    /// Overwrite the form fields the user sees.
    pub fn fill_draft(&self, draft: &mut MovieDraft) {
        draft.name = self.title.clone();
        draft.year = self.year.clone();
        draft.genre = self.genre.clone();
        draft.rating = format!("{:.1}", self.rating);
    }

    /// Overwrite every matched field of a stored record.
    pub fn apply_to(&self, movie: &mut Movie) {
        if !self.title.trim().is_empty() {
            movie.name = self.title.trim().to_string();
        }
        movie.year = self.year.clone();
        movie.genre = self.genre.clone();
        movie.set_rating(self.rating);
        movie.poster_path = self.poster_path.clone();
        movie.set_tmdb_id(self.tmdb_id);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CastMember {
    pub name: String,
    pub character: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Credits {
    pub director: Option<String>,
    pub cast: Vec<CastMember>,
}

impl Credits {
    fn from_raw(raw: RawCredits, cast_limit: usize) -> Self {
        let director = raw
            .crew
            .into_iter()
            .find(|c| c.job.as_deref() == Some("Director") && !c.name.trim().is_empty())
            .map(|c| c.name);
        let cast = raw
            .cast
            .into_iter()
            .filter(|c| !c.name.trim().is_empty())
            .take(cast_limit)
            .map(|c| CastMember {
                name: c.name,
                character: c.character.filter(|s| !s.trim().is_empty()),
            })
            .collect();
        Self { director, cast }
    }

    pub fn director_label(&self) -> &str {
        self.director.as_deref().unwrap_or("Unknown director")
    }

    pub fn cast_label(&self) -> String {
        if self.cast.is_empty() {
            "No cast listed".to_string()
        } else {
            self.cast.iter().map(|c| c.name.as_str()).join(", ")
        }
    }
}

pub struct MetadataClient<A> {
    api: A,
    cast_limit: usize,
    searches: SharedCache<(String, Option<String>), Option<MovieMatch>>,
    credits: SharedCache<u64, Credits>,
    images: SharedCache<String, Arc<[u8]>>,
}

impl<A> std::fmt::Debug for MetadataClient<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataClient")
            .field("cast_limit", &self.cast_limit)
            .field("memoized_searches", &self.searches.len())
            .finish()
    }
}

impl<A: CatalogApi> MetadataClient<A> {
    pub fn new(api: A, cast_limit: usize) -> Self {
        Self {
            api,
            cast_limit: cast_limit.max(1),
            searches: SharedCache::new(BoundedCache::new(SEARCH_MEMO)),
            credits: SharedCache::new(BoundedCache::new(CREDITS_MEMO)),
            images: SharedCache::new(BoundedCache::new(IMAGE_MEMO)),
        }
    }

    /// Best match for a title, retrying once without the year if the
    /// year-qualified query comes back empty. `Ok(None)` means not found.
    pub fn search(
        &self,
        title: &str,
        year_hint: Option<&str>,
    ) -> Result<Option<MovieMatch>, LookupError> {
        let query = clean_search_title(title);
        if query.is_empty() {
            return Ok(None);
        }
        let year = year_hint
            .and_then(normalize_year_hint)
            .or_else(|| extract_year(title));

        let memo_key = (query.to_lowercase(), year.clone());
        if let Some(hit) = self.searches.get(&memo_key) {
            debug!("search memo hit for `{query}`");
            return Ok(hit);
        }

        let mut hits = self.api.search_movies(&query, year.as_deref())?;
        if hits.is_empty() {
            if let Some(y) = &year {
                info!("no results for `{query}` in {y}; retrying without year");
                hits = self.api.search_movies(&query, None)?;
            }
        }

        let found = hits
            .into_iter()
            .next()
            .map(|hit| MovieMatch::from_hit(hit, &query));
        self.searches.put(memo_key, found.clone());
        Ok(found)
    }

    pub fn fetch_credits(&self, tmdb_id: u64) -> Result<Credits, LookupError> {
        if let Some(c) = self.credits.get(&tmdb_id) {
            return Ok(c);
        }
        let credits = Credits::from_raw(self.api.movie_credits(tmdb_id)?, self.cast_limit);
        self.credits.put(tmdb_id, credits.clone());
        Ok(credits)
    }

    /// Raw poster bytes; an empty identifier yields empty bytes without a request.
    pub fn fetch_image_bytes(&self, poster_path: &str) -> Result<Arc<[u8]>, LookupError> {
        let poster_path = poster_path.trim();
        if poster_path.is_empty() {
            return Ok(Arc::from(Vec::new()));
        }
        let key = poster_path.to_string();
        if let Some(bytes) = self.images.get(&key) {
            return Ok(bytes);
        }
        let bytes: Arc<[u8]> = Arc::from(self.api.poster_bytes(poster_path)?);
        self.images.put(key, Arc::clone(&bytes));
        Ok(bytes)
    }
}

impl<A: CatalogApi> ImageSource for MetadataClient<A> {
    fn image_bytes(&self, poster_path: &str) -> Result<Arc<[u8]>, LookupError> {
        self.fetch_image_bytes(poster_path)
    }
}
