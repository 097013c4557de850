// src/app/catalog/genres.rs
use std::borrow::Cow;

// TMDB movie genre ids; the list is fixed by the service.
const MOVIE_GENRES: &[(u32, &str)] = &[
    (28, "Action"),
    (12, "Adventure"),
    (16, "Animation"),
    (35, "Comedy"),
    (80, "Crime"),
    (99, "Documentary"),
    (18, "Drama"),
    (10751, "Family"),
    (14, "Fantasy"),
    (36, "History"),
    (27, "Horror"),
    (10402, "Music"),
    (9648, "Mystery"),
    (10749, "Romance"),
    (878, "Science Fiction"),
    (10770, "TV Movie"),
    (53, "Thriller"),
    (10752, "War"),
    (37, "Western"),
];

/// Display name for a genre id; unknown ids fall back to the number.
pub fn genre_name(id: u32) -> Cow<'static, str> {
    MOVIE_GENRES
        .iter()
        .find(|(gid, _)| *gid == id)
        .map_or_else(|| Cow::Owned(id.to_string()), |(_, name)| Cow::Borrowed(*name))
}

#[cfg(test)]
mod tests {
    use super::genre_name;

    #[test]
    fn maps_known_and_unknown_ids() {
        assert_eq!(genre_name(878), "Science Fiction");
        assert_eq!(genre_name(4242), "4242");
    }
}
