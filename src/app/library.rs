// src/app/library.rs
//! The in-memory collection plus its view state.
//!
//! All mutation goes through [`Library::apply`]; the returned effects tell the
//! shell what to do next (persist, show a status, show a validation message).

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::{debug, info};

use crate::app::catalog::MovieMatch;
use crate::app::data::{Movie, MovieDraft};
use crate::app::types::{FilterMode, RecordId, SortKey};

pub const PAGE_SIZE: usize = 30;

#[derive(Clone, Debug)]
pub enum LibraryEvent {
    SearchChanged(String),
    SortChanged(SortKey),
    FilterChanged(FilterMode),
    PageRequested,
    Select(Option<RecordId>),
    Submit(MovieDraft),
    DeleteSelected,
    /// A catalog match arrived. `target: None` means the form was not bound
    /// to a record; the poster and id are kept for the next new record.
    LookupApplied {
        target: Option<RecordId>,
        matched: MovieMatch,
    },
    Imported(Vec<Movie>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Persist,
    Status(String),
    Invalid(String),
}

#[derive(Debug, Default)]
struct PendingMatch {
    poster_path: String,
    tmdb_id: Option<u64>,
}

#[derive(Debug)]
pub struct Library {
    records: Vec<(RecordId, Movie)>,
    next_id: u64,
    search: String,
    filter: FilterMode,
    sort: SortKey,
    pages: usize,
    selected: Option<RecordId>,
    pending: Option<PendingMatch>,
    visible: Vec<RecordId>,
}

impl Library {
    pub fn new(movies: Vec<Movie>, sort: SortKey, filter: FilterMode) -> Self {
        let mut lib = Self {
            records: Vec::with_capacity(movies.len()),
            next_id: 1,
            search: String::new(),
            filter,
            sort,
            pages: 1,
            selected: None,
            pending: None,
            visible: Vec::new(),
        };
        for m in movies {
            lib.push(m);
        }
        lib.rebuild();
        lib
    }

    fn push(&mut self, movie: Movie) -> RecordId {
        let id = RecordId(self.next_id);
        self.next_id += 1;
        self.records.push((id, movie));
        id
    }

    // ---- read side ----
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<&Movie> {
        self.records.iter().find(|(rid, _)| *rid == id).map(|(_, m)| m)
    }

    fn get_mut(&mut self, id: RecordId) -> Option<&mut Movie> {
        self.records
            .iter_mut()
            .find(|(rid, _)| *rid == id)
            .map(|(_, m)| m)
    }

    /// Records in insertion order, the order they are saved in.
    pub fn movies(&self) -> Vec<Movie> {
        self.records.iter().map(|(_, m)| m.clone()).collect()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    pub fn selected(&self) -> Option<RecordId> {
        self.selected
    }

    pub fn selected_movie(&self) -> Option<&Movie> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Every record passing search and filter, sorted.
    pub fn visible(&self) -> &[RecordId] {
        &self.visible
    }

    pub fn visible_page(&self) -> &[RecordId] {
        let end = (self.pages * PAGE_SIZE).min(self.visible.len());
        &self.visible[..end]
    }

    /// Records that need a poster this frame: the loaded page plus the
    /// selection, which stays in the detail panel even when filtered out.
    pub fn poster_targets(&self) -> Vec<RecordId> {
        let mut ids = self.visible_page().to_vec();
        if let Some(id) = self.selected.filter(|id| !ids.contains(id)) {
            ids.push(id);
        }
        ids
    }

    pub fn has_more(&self) -> bool {
        self.pages * PAGE_SIZE < self.visible.len()
    }

    pub fn showing_label(&self) -> String {
        format!(
            "Showing {}/{} movies",
            self.visible_page().len(),
            self.visible.len()
        )
    }

    // ---- write side ----
    pub fn apply(&mut self, event: LibraryEvent) -> Vec<Effect> {
        match event {
            LibraryEvent::SearchChanged(text) => {
                self.search = text;
                self.reset_view();
                Vec::new()
            }
            LibraryEvent::SortChanged(sort) => {
                self.sort = sort;
                self.reset_view();
                Vec::new()
            }
            LibraryEvent::FilterChanged(filter) => {
                self.filter = filter;
                self.reset_view();
                Vec::new()
            }
            LibraryEvent::PageRequested => {
                if self.has_more() {
                    self.pages += 1;
                }
                vec![Effect::Status(self.showing_label())]
            }
            LibraryEvent::Select(id) => {
                self.selected = id.filter(|id| self.get(*id).is_some());
                self.pending = None;
                Vec::new()
            }
            LibraryEvent::Submit(draft) => self.submit(&draft),
            LibraryEvent::DeleteSelected => self.delete_selected(),
            LibraryEvent::LookupApplied { target, matched } => self.lookup_applied(target, &matched),
            LibraryEvent::Imported(movies) => self.import(movies),
        }
    }

    fn submit(&mut self, draft: &MovieDraft) -> Vec<Effect> {
        let mut fresh = match draft.validate() {
            Ok(m) => m,
            Err(e) => return vec![Effect::Invalid(e.to_string())],
        };

        let name = fresh.name.clone();
        let updated = match self.selected.and_then(|id| self.get_mut(id)) {
            Some(existing) => {
                fresh.poster_path = std::mem::take(&mut existing.poster_path);
                fresh.file_path = std::mem::take(&mut existing.file_path);
                fresh.tmdb_id = existing.tmdb_id;
                *existing = fresh;
                true
            }
            None => {
                if let Some(p) = self.pending.take() {
                    fresh.poster_path = p.poster_path;
                    fresh.set_tmdb_id(p.tmdb_id);
                }
                let id = self.push(fresh);
                self.selected = Some(id);
                false
            }
        };
        self.rebuild();

        let verb = if updated { "Updated" } else { "Added" };
        info!("{verb} `{name}`");
        vec![Effect::Persist, Effect::Status(format!("{verb} '{name}'"))]
    }

    fn delete_selected(&mut self) -> Vec<Effect> {
        let Some(id) = self.selected.take() else {
            return Vec::new();
        };
        let Some(pos) = self.records.iter().position(|(rid, _)| *rid == id) else {
            return Vec::new();
        };
        let (_, removed) = self.records.remove(pos);
        self.rebuild();
        info!("Deleted `{}`", removed.name);
        vec![Effect::Persist, Effect::Status(format!("Deleted '{}'", removed.name))]
    }

    fn lookup_applied(&mut self, target: Option<RecordId>, matched: &MovieMatch) -> Vec<Effect> {
        match target {
            Some(id) => match self.get_mut(id) {
                Some(movie) => {
                    movie.poster_path = matched.poster_path.clone();
                    movie.set_tmdb_id(matched.tmdb_id);
                    self.rebuild();
                }
                None => debug!("lookup result for removed record {id:?} dropped"),
            },
            None => {
                self.pending = Some(PendingMatch {
                    poster_path: matched.poster_path.clone(),
                    tmdb_id: matched.tmdb_id,
                });
            }
        }
        vec![Effect::Status("Fetch complete".into())]
    }

    fn import(&mut self, movies: Vec<Movie>) -> Vec<Effect> {
        let mut known: HashSet<String> = self
            .records
            .iter()
            .filter(|(_, m)| m.has_file())
            .map(|(_, m)| m.file_path.clone())
            .collect();

        let mut added = 0usize;
        for m in movies {
            if m.has_file() && !known.insert(m.file_path.clone()) {
                continue;
            }
            self.push(m);
            added += 1;
        }
        if added == 0 {
            return vec![Effect::Status("No new files found".into())];
        }
        self.rebuild();
        vec![Effect::Persist, Effect::Status(format!("Imported {added} movies"))]
    }

    // ---- view ----
    fn reset_view(&mut self) {
        self.pages = 1;
        self.rebuild();
    }

    fn rebuild(&mut self) {
        let needle = self.search.trim().to_lowercase();
        let filter = self.filter;
        let mut rows: Vec<(RecordId, &Movie)> = self
            .records
            .iter()
            .filter(|(_, m)| needle.is_empty() || m.name.to_lowercase().contains(&needle))
            .filter(|(_, m)| passes_filter(m, filter))
            .map(|(id, m)| (*id, m))
            .collect();
        let sort = self.sort;
        rows.sort_by(|a, b| compare(a.1, b.1, sort));
        self.visible = rows.into_iter().map(|(id, _)| id).collect();
    }
}

fn passes_filter(m: &Movie, filter: FilterMode) -> bool {
    match filter {
        FilterMode::All => true,
        FilterMode::Watched => m.watched,
        FilterMode::Unwatched => !m.watched,
        FilterMode::Favorites => m.favorite,
        FilterMode::Watchlist => m.watchlist,
    }
}

// Stable sort keeps insertion order for ties.
fn compare(a: &Movie, b: &Movie, sort: SortKey) -> Ordering {
    match sort {
        SortKey::Title => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::Year => year_key(b).cmp(year_key(a)),
        SortKey::Rating => b.rating.total_cmp(&a.rating),
    }
}

fn year_key(m: &Movie) -> &str {
    if m.year.is_empty() {
        "0"
    } else {
        &m.year
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(name: &str, year: &str, rating: f32) -> Movie {
        let mut m = Movie::new(name).unwrap();
        m.year = year.into();
        m.set_rating(rating);
        m
    }

    fn names(lib: &Library) -> Vec<String> {
        lib.visible()
            .iter()
            .map(|id| lib.get(*id).unwrap().name.clone())
            .collect()
    }

    fn draft(name: &str, rating: &str) -> MovieDraft {
        MovieDraft {
            name: name.into(),
            rating: rating.into(),
            ..MovieDraft::default()
        }
    }

    fn lib() -> Library {
        Library::new(
            vec![
                movie("heat", "1995", 8.3),
                movie("Alien", "1979", 8.5),
                movie("Blade Runner", "", 8.1),
            ],
            SortKey::Title,
            FilterMode::All,
        )
    }

    #[test]
    fn selection_hidden_by_filter_still_wants_a_poster() {
        let mut l = lib();
        let alien = l.visible()[0];
        l.apply(LibraryEvent::Select(Some(alien)));
        l.apply(LibraryEvent::SearchChanged("heat".into()));

        assert!(!l.visible_page().contains(&alien));
        let targets = l.poster_targets();
        assert_eq!(targets.len(), 2);
        assert!(targets.contains(&alien));

        l.apply(LibraryEvent::SearchChanged(String::new()));
        assert_eq!(l.poster_targets().len(), 3);
    }

    #[test]
    fn sorts_by_each_key() {
        let mut l = lib();
        assert_eq!(names(&l), ["Alien", "Blade Runner", "heat"]);
        l.apply(LibraryEvent::SortChanged(SortKey::Year));
        assert_eq!(names(&l), ["heat", "Alien", "Blade Runner"]);
        l.apply(LibraryEvent::SortChanged(SortKey::Rating));
        assert_eq!(names(&l), ["Alien", "heat", "Blade Runner"]);
    }

    #[test]
    fn search_and_filter_compose() {
        let mut l = lib();
        let alien = l.visible()[0];
        l.apply(LibraryEvent::Select(Some(alien)));
        let mut d = draft("Alien", "8.5");
        d.watched = true;
        l.apply(LibraryEvent::Submit(d));

        l.apply(LibraryEvent::FilterChanged(FilterMode::Watched));
        assert_eq!(names(&l), ["Alien"]);
        l.apply(LibraryEvent::FilterChanged(FilterMode::Unwatched));
        assert_eq!(names(&l), ["Blade Runner", "heat"]);
        l.apply(LibraryEvent::SearchChanged("RUN".into()));
        assert_eq!(names(&l), ["Blade Runner"]);
        l.apply(LibraryEvent::FilterChanged(FilterMode::Favorites));
        assert!(l.visible().is_empty());
    }

    #[test]
    fn pages_grow_and_reset() {
        let movies = (0..75).map(|i| movie(&format!("M{i:03}"), "", 5.0)).collect();
        let mut l = Library::new(movies, SortKey::Title, FilterMode::All);
        assert_eq!(l.visible_page().len(), 30);
        assert!(l.has_more());
        l.apply(LibraryEvent::PageRequested);
        assert_eq!(l.visible_page().len(), 60);
        let fx = l.apply(LibraryEvent::PageRequested);
        assert_eq!(l.visible_page().len(), 75);
        assert!(!l.has_more());
        assert_eq!(fx, vec![Effect::Status("Showing 75/75 movies".into())]);
        l.apply(LibraryEvent::PageRequested);
        assert_eq!(l.visible_page().len(), 75);

        l.apply(LibraryEvent::SearchChanged("M0".into()));
        assert_eq!(l.visible().len(), 75);
        assert_eq!(l.visible_page().len(), 30);
    }

    #[test]
    fn submit_adds_then_updates_in_place() {
        let mut l = Library::new(Vec::new(), SortKey::Title, FilterMode::All);
        let fx = l.apply(LibraryEvent::Submit(draft("  Heat ", "15")));
        assert_eq!(fx[0], Effect::Persist);
        let id = l.selected().unwrap();
        assert_eq!(l.get(id).unwrap().rating, 10.0);

        // Fields the form does not edit survive an update.
        l.apply(LibraryEvent::LookupApplied {
            target: Some(id),
            matched: MovieMatch {
                title: "Heat".into(),
                year: "1995".into(),
                genre: String::new(),
                rating: 8.3,
                poster_path: "/heat.jpg".into(),
                tmdb_id: Some(949),
            },
        });
        l.apply(LibraryEvent::Submit(draft("Heat", "9")));
        assert_eq!(l.len(), 1);
        let m = l.get(id).unwrap();
        assert_eq!(m.rating, 9.0);
        assert_eq!(m.poster_path, "/heat.jpg");
        assert_eq!(m.tmdb_id, Some(949));
    }

    #[test]
    fn invalid_submit_mutates_nothing() {
        let mut l = lib();
        let fx = l.apply(LibraryEvent::Submit(draft("   ", "5")));
        assert!(matches!(fx.as_slice(), [Effect::Invalid(_)]));
        let fx = l.apply(LibraryEvent::Submit(draft("Heat", "lots")));
        assert!(matches!(fx.as_slice(), [Effect::Invalid(_)]));
        assert_eq!(l.len(), 3);
    }

    #[test]
    fn lookup_without_target_attaches_to_next_new_record() {
        let mut l = lib();
        let fx = l.apply(LibraryEvent::LookupApplied {
            target: None,
            matched: MovieMatch {
                title: "Aliens".into(),
                year: "1986".into(),
                genre: String::new(),
                rating: 8.0,
                poster_path: "/aliens.jpg".into(),
                tmdb_id: Some(679),
            },
        });
        assert!(!fx.contains(&Effect::Persist));
        l.apply(LibraryEvent::Submit(draft("Aliens", "8")));
        let m = l.selected_movie().unwrap();
        assert_eq!(m.poster_path, "/aliens.jpg");
        assert_eq!(m.tmdb_id, Some(679));
    }

    #[test]
    fn lookup_for_removed_record_is_dropped() {
        let mut l = lib();
        let id = l.visible()[0];
        l.apply(LibraryEvent::Select(Some(id)));
        l.apply(LibraryEvent::DeleteSelected);
        assert!(l.get(id).is_none());
        assert_eq!(l.selected(), None);
        l.apply(LibraryEvent::LookupApplied {
            target: Some(id),
            matched: MovieMatch {
                title: "x".into(),
                year: String::new(),
                genre: String::new(),
                rating: 0.0,
                poster_path: "/x.jpg".into(),
                tmdb_id: None,
            },
        });
        assert!(l.movies().iter().all(|m| m.poster_path.is_empty()));
    }

    #[test]
    fn delete_without_selection_is_a_no_op() {
        let mut l = lib();
        assert!(l.apply(LibraryEvent::DeleteSelected).is_empty());
        assert_eq!(l.len(), 3);
    }

    #[test]
    fn import_skips_known_files() {
        let mut l = lib();
        let mut a = movie("Alien", "1979", 0.0);
        a.file_path = "/films/Alien.mkv".into();
        let mut b = movie("Heat", "1995", 0.0);
        b.file_path = "/films/Heat.mkv".into();

        l.apply(LibraryEvent::Imported(vec![a.clone()]));
        assert_eq!(l.len(), 4);
        let fx = l.apply(LibraryEvent::Imported(vec![a.clone(), b, a]));
        assert_eq!(l.len(), 5);
        assert_eq!(fx[1], Effect::Status("Imported 1 movies".into()));
        let fx = l.apply(LibraryEvent::Imported(Vec::new()));
        assert_eq!(fx, vec![Effect::Status("No new files found".into())]);
    }
}
