// src/app/types.rs
use eframe::egui::TextureHandle;
use serde::{Deserialize, Serialize};

use crate::app::cache::{CacheKey, PosterImage};
use crate::app::catalog::{Credits, MovieMatch};
use crate::app::data::Movie;

/// Session-only handle for a record in the library. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub u64);

// ---- cross-thread messages ----
#[derive(Clone, Debug)]
pub enum PosterOutcome {
    Ready(PosterImage),
    NoPoster,
    Failed(String),
}

#[derive(Clone, Debug)]
pub struct PosterDelivery {
    pub target: RecordId,
    pub key: Option<CacheKey>,
    pub outcome: PosterOutcome,
}

/// Results of background lookups and folder scans.
pub enum TaskMsg {
    /// Search finished; `None` means the catalog had no match. Credits for
    /// the match travel with it, `None` when they could not be fetched.
    Matched {
        target: Option<RecordId>,
        query: String,
        matched: Option<MovieMatch>,
        credits: Option<Credits>,
    },
    /// Answer to a credits request for an already matched record.
    Credits {
        tmdb_id: u64,
        credits: Option<Credits>,
    },
    Scanned {
        root: String,
        movies: Vec<Movie>,
    },
    Error {
        what: &'static str,
        error: String,
    },
}

// ---- per-card poster state (UI thread only) ----
pub enum PosterSlot {
    Loading,
    NoPoster,
    Failed,
    Ready(TextureHandle),
}

pub struct CardPoster {
    pub key: Option<CacheKey>,
    pub slot: PosterSlot,
}

// ---- UI controls ----
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Title,
    Year,
    Rating,
}

impl SortKey {
    pub const ALL: [Self; 3] = [Self::Title, Self::Year, Self::Rating];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Year => "Year",
            Self::Rating => "Rating",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    #[default]
    All,
    Watched,
    Unwatched,
    Favorites,
    Watchlist,
}

impl FilterMode {
    pub const ALL: [Self; 5] = [
        Self::All,
        Self::Watched,
        Self::Unwatched,
        Self::Favorites,
        Self::Watchlist,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Watched => "Watched",
            Self::Unwatched => "Unwatched",
            Self::Favorites => "Favorites",
            Self::Watchlist => "Watchlist",
        }
    }
}
