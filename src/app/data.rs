// src/app/data.rs
use serde::Serialize;
use serde_json::Value;

use crate::app::error::ValidationError;

pub const RATING_MIN: f32 = 0.0;
pub const RATING_MAX: f32 = 10.0;

/// One entry of the collection. Field names are the on-disk JSON keys.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Movie {
    pub name: String,
    pub year: String,
    pub genre: String,
    pub rating: f32,
    pub watched: bool,
    pub favorite: bool,
    pub watchlist: bool,
    pub poster_path: String,
    pub file_path: String,
    pub tmdb_id: Option<u64>,
}

pub fn clamp_rating(rating: f32) -> f32 {
    if rating.is_nan() {
        return RATING_MIN;
    }
    rating.clamp(RATING_MIN, RATING_MAX)
}

impl Movie {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(Self {
            name: name.to_string(),
            year: String::new(),
            genre: String::new(),
            rating: 0.0,
            watched: false,
            favorite: false,
            watchlist: false,
            poster_path: String::new(),
            file_path: String::new(),
            tmdb_id: None,
        })
    }

    pub fn set_rating(&mut self, rating: f32) {
        self.rating = clamp_rating(rating);
    }

    pub fn set_tmdb_id(&mut self, id: Option<u64>) {
        self.tmdb_id = id.filter(|&id| id > 0);
    }

    pub fn has_poster(&self) -> bool {
        !self.poster_path.is_empty()
    }

    pub fn has_file(&self) -> bool {
        !self.file_path.is_empty()
    }

    /// Build a record from one element of the collection file.
    ///
    /// Every field is read on its own: bad optional fields fall back to their
    /// defaults, only a missing or blank name rejects the element.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let Some(obj) = value.as_object() else {
            return Err(ValidationError::EmptyName);
        };
        let text = |k: &str| obj.get(k).map(value_to_text).unwrap_or_default();
        let flag = |k: &str| obj.get(k).is_some_and(value_to_bool);

        let mut movie = Self::new(&text("name"))?;
        movie.year = text("year").trim().to_string();
        movie.genre = text("genre").trim().to_string();
        movie.set_rating(obj.get("rating").and_then(value_to_f32).unwrap_or(0.0));
        movie.watched = flag("watched");
        movie.favorite = flag("favorite");
        movie.watchlist = flag("watchlist");
        movie.poster_path = text("poster_path").trim().to_string();
        movie.file_path = text("file_path").trim().to_string();
        movie.set_tmdb_id(obj.get("tmdb_id").and_then(value_to_id));
        Ok(movie)
    }
}

fn value_to_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn value_to_f32(v: &Value) -> Option<f32> {
    let n = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n as f32)
}

fn value_to_bool(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes"
        ),
        _ => false,
    }
}

fn value_to_id(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

/// Raw form input, everything still text.
#[derive(Clone, Debug, PartialEq)]
pub struct MovieDraft {
    pub name: String,
    pub year: String,
    pub genre: String,
    pub rating: String,
    pub watched: bool,
    pub favorite: bool,
    pub watchlist: bool,
}

impl Default for MovieDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            year: String::new(),
            genre: String::new(),
            rating: "5.0".into(),
            watched: false,
            favorite: false,
            watchlist: false,
        }
    }
}

impl MovieDraft {
    pub fn from_movie(movie: &Movie) -> Self {
        Self {
            name: movie.name.clone(),
            year: movie.year.clone(),
            genre: movie.genre.clone(),
            rating: format!("{:.1}", movie.rating),
            watched: movie.watched,
            favorite: movie.favorite,
            watchlist: movie.watchlist,
        }
    }

    pub fn parse_rating(&self) -> Result<f32, ValidationError> {
        let raw = self.rating.trim();
        if raw.is_empty() {
            return Ok(0.0);
        }
        match raw.parse::<f32>() {
            Ok(v) if v.is_finite() => Ok(clamp_rating(v)),
            _ => Err(ValidationError::RatingNotNumeric(raw.to_string())),
        }
    }

    /// Fresh record from the form; poster, file and catalog id stay empty.
    pub fn validate(&self) -> Result<Movie, ValidationError> {
        let mut movie = Movie::new(&self.name)?;
        movie.rating = self.parse_rating()?;
        movie.year = self.year.trim().to_string();
        movie.genre = self.genre.trim().to_string();
        movie.watched = self.watched;
        movie.favorite = self.favorite;
        movie.watchlist = self.watchlist;
        Ok(movie)
    }
}
