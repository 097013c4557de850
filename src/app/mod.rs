// src/app/mod.rs: eframe shell, owns the library, drains worker results, renders panels

// ---- Standard lib imports ----
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

// ---- Crates ----
use eframe::egui as eg;
use tracing::{debug, error, info, warn};

// ---- Local modules ----
pub mod cache;
pub mod catalog;
pub mod data;
pub mod detail;
pub mod error;
pub mod fetch;
pub mod gfx;
pub mod library;
pub mod local;
pub mod pool;
pub mod prefs;
pub mod slots;
pub mod store;
pub mod types;
pub mod ui;
pub mod utils;

use crate::app::cache::{BoundedCache, CacheKey, SharedCache, TargetSize};
use crate::app::catalog::{ImageSource, MetadataClient, TmdbApi};
use crate::app::data::MovieDraft;
use crate::app::fetch::PosterDispatcher;
use crate::app::library::{Effect, Library, LibraryEvent};
use crate::app::pool::WorkerPool;
use crate::app::prefs::{SaveDebounce, Settings};
use crate::app::slots::{CreditsState, PosterSlots};
use crate::app::store::CollectionStore;
use crate::app::types::{PosterDelivery, PosterSlot, RecordId, TaskMsg};
use crate::config::AppConfig;

// ---- Tunables ----
const MAX_DELIVERIES_PER_FRAME: usize = 12;
const MAX_TASK_MSGS_PER_FRAME: usize = 8;
const SEARCH_DEBOUNCE: Duration = Duration::from_millis(250);
const SETTINGS_DEBOUNCE: Duration = Duration::from_millis(300);
pub const POSTER_SIZE: TargetSize = TargetSize::new(140, 200);

type Catalog = MetadataClient<TmdbApi>;

pub struct MovieCatApp {
    cfg: AppConfig,
    egui_ctx: eg::Context,
    store: CollectionStore,
    library: Library,

    // settings
    settings: Settings,
    settings_save: SaveDebounce,

    // background plumbing
    pool: Arc<WorkerPool>,
    catalog: Option<Arc<Catalog>>,
    dispatcher: Option<PosterDispatcher>,
    poster_rx: Receiver<PosterDelivery>,
    task_tx: Sender<TaskMsg>,
    task_rx: Receiver<TaskMsg>,

    // per-card poster state, keyed by record
    posters: PosterSlots,

    // form + detail
    draft: MovieDraft,
    credits: CreditsState,
    lookup_in_flight: bool,
    scan_in_flight: bool,
    import_path: String,

    // top bar
    search_text: String,
    search_edited_at: Option<Instant>,

    // status + modals
    status: String,
    confirm_delete: bool,
    message: Option<(&'static str, String)>,
}

impl MovieCatApp {
    pub fn new(cc: &eframe::CreationContext<'_>, cfg: AppConfig) -> Self {
        let store = CollectionStore::new(cfg.data_file.clone(), cfg.settings_file.clone());
        let settings = store.load_settings();
        let movies = store.load();
        let library = Library::new(movies, settings.sort, settings.filter);
        cc.egui_ctx.set_visuals(visuals_for(settings.dark_mode));

        let pool = Arc::new(WorkerPool::new(cfg.worker_count, "moviecat-worker"));
        info!("{} background workers", pool.workers());
        let (poster_tx, poster_rx) = mpsc::channel();
        let (task_tx, task_rx) = mpsc::channel();

        let catalog = match TmdbApi::from_config(&cfg) {
            Ok(api) => {
                if !api.has_api_key() {
                    warn!("no TMDB API key configured; lookups and posters are disabled");
                }
                Some(Arc::new(MetadataClient::new(api, cfg.cast_limit)))
            }
            Err(e) => {
                error!("catalog client unavailable: {e}");
                None
            }
        };

        let dispatcher = catalog.as_ref().map(|c| {
            let ctx = cc.egui_ctx.clone();
            let source: Arc<dyn ImageSource> = c.clone();
            PosterDispatcher::new(
                SharedCache::new(BoundedCache::new(cfg.cache_capacity)),
                source,
                Arc::clone(&pool),
                poster_tx,
                Arc::new(move || ctx.request_repaint()),
            )
        });

        let status = format!("Loaded {} movies", library.len());
        info!("{status}");
        let import_path = cfg.library_roots.first().cloned().unwrap_or_default();

        Self {
            cfg,
            egui_ctx: cc.egui_ctx.clone(),
            store,
            library,
            settings,
            settings_save: SaveDebounce::new(SETTINGS_DEBOUNCE),
            pool,
            catalog,
            dispatcher,
            poster_rx,
            task_tx,
            task_rx,
            posters: PosterSlots::default(),
            draft: MovieDraft::default(),
            credits: CreditsState::default(),
            lookup_in_flight: false,
            scan_in_flight: false,
            import_path,
            search_text: String::new(),
            search_edited_at: None,
            status,
            confirm_delete: false,
            message: None,
        }
    }

    // ----- tiny helpers ----
    fn set_status<S: Into<String>>(&mut self, s: S) {
        self.status = s.into();
    }

    fn show_message(&mut self, title: &'static str, body: impl Into<String>) {
        self.message = Some((title, body.into()));
    }

    fn dispatch(&mut self, event: LibraryEvent) {
        let effects = self.library.apply(event);
        self.handle_effects(effects);
    }

    fn handle_effects(&mut self, effects: Vec<Effect>) {
        for fx in effects {
            match fx {
                Effect::Persist => self.persist(),
                Effect::Status(s) => self.set_status(s),
                Effect::Invalid(msg) => self.show_message("Validation", msg),
            }
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.library.movies()) {
            error!("save failed: {e}");
            self.show_message("Save Error", e.to_string());
        }
    }

    fn settings_changed(&mut self) {
        self.settings.sort = self.library.sort();
        self.settings.filter = self.library.filter();
        self.settings_save.mark_dirty();
    }

    fn flush_settings(&mut self) {
        if let Err(e) = self.store.save_settings(&self.settings) {
            warn!("settings not saved: {e}");
        }
    }

    pub(crate) fn toggle_theme(&mut self, ctx: &eg::Context) {
        self.settings.dark_mode = !self.settings.dark_mode;
        ctx.set_visuals(visuals_for(self.settings.dark_mode));
        self.settings_save.mark_dirty();
    }

    // ----- selection + form ----
    pub(crate) fn select(&mut self, id: Option<RecordId>) {
        self.dispatch(LibraryEvent::Select(id));
        self.draft = match self.library.selected_movie() {
            Some(m) => MovieDraft::from_movie(m),
            None => MovieDraft::default(),
        };
        self.credits.clear();
        if let Some(tmdb_id) = self.library.selected_movie().and_then(|m| m.tmdb_id) {
            self.request_credits(tmdb_id);
        }
    }

    pub(crate) fn submit_form(&mut self) {
        let draft = self.draft.clone();
        self.dispatch(LibraryEvent::Submit(draft));
    }

    pub(crate) fn delete_confirmed(&mut self) {
        if let Some(id) = self.library.selected() {
            self.posters.remove(id);
        }
        self.dispatch(LibraryEvent::DeleteSelected);
        self.draft = MovieDraft::default();
        self.credits.clear();
    }

    // ----- background work ----
    pub(crate) fn start_auto_fetch(&mut self, ctx: &eg::Context) {
        let query = self.draft.name.trim().to_string();
        if query.is_empty() {
            self.show_message("Missing data", "Type a movie title first");
            return;
        }
        let Some(catalog) = self.catalog.clone() else {
            self.show_message("TMDB", "No catalog client available");
            return;
        };
        let year = self.draft.year.trim().to_string();
        let target = self.library.selected();
        let tx = self.task_tx.clone();
        let ctx = ctx.clone();

        let queued = self.pool.submit(move || {
            let year_hint = (!year.is_empty()).then_some(year.as_str());
            let msg = match catalog.search(&query, year_hint) {
                Ok(matched) => {
                    let credits = matched
                        .as_ref()
                        .and_then(|m| m.tmdb_id)
                        .and_then(|id| match catalog.fetch_credits(id) {
                            Ok(c) => Some(c),
                            Err(e) => {
                                warn!("credits for {id}: {e}");
                                None
                            }
                        });
                    TaskMsg::Matched {
                        target,
                        query,
                        matched,
                        credits,
                    }
                }
                Err(e) => TaskMsg::Error {
                    what: "TMDB",
                    error: e.to_string(),
                },
            };
            let _ = tx.send(msg);
            ctx.request_repaint();
        });

        if queued {
            self.lookup_in_flight = true;
            self.set_status("Fetching TMDB data...");
        } else {
            self.show_message("TMDB", "Worker pool unavailable");
        }
    }

    fn request_credits(&mut self, tmdb_id: u64) {
        let Some(catalog) = self.catalog.clone() else {
            self.credits.replace(tmdb_id, None);
            return;
        };
        let tx = self.task_tx.clone();
        let ctx = self.egui_ctx.clone();
        let queued = self.pool.submit(move || {
            let credits = match catalog.fetch_credits(tmdb_id) {
                Ok(c) => Some(c),
                Err(e) => {
                    debug!("credits for {tmdb_id}: {e}");
                    None
                }
            };
            let _ = tx.send(TaskMsg::Credits { tmdb_id, credits });
            ctx.request_repaint();
        });
        if queued {
            self.credits.start(tmdb_id);
        } else {
            warn!("credits for {tmdb_id} not queued: worker pool unavailable");
            self.credits.replace(tmdb_id, None);
        }
    }

    pub(crate) fn start_import(&mut self, ctx: &eg::Context) {
        let root = self.import_path.trim().to_string();
        if root.is_empty() {
            self.show_message("Import", "Enter a folder to import");
            return;
        }
        let tx = self.task_tx.clone();
        let ctx = ctx.clone();
        let queued = self.pool.submit(move || {
            let movies = local::scan_video_files(&PathBuf::from(&root));
            let _ = tx.send(TaskMsg::Scanned { root, movies });
            ctx.request_repaint();
        });
        if queued {
            self.scan_in_flight = true;
            self.set_status("Scanning folder...");
        }
    }

    fn poll_tasks(&mut self) {
        for _ in 0..MAX_TASK_MSGS_PER_FRAME {
            let msg = match self.task_rx.try_recv() {
                Ok(msg) => msg,
                Err(mpsc::TryRecvError::Empty | mpsc::TryRecvError::Disconnected) => break,
            };
            match msg {
                TaskMsg::Matched {
                    target,
                    query,
                    matched,
                    credits,
                } => {
                    self.lookup_in_flight = false;
                    match matched {
                        Some(m) => {
                            // Only fill the form if it still shows the record we searched for.
                            if target == self.library.selected() {
                                m.fill_draft(&mut self.draft);
                                if let Some(tmdb_id) = m.tmdb_id {
                                    self.credits.replace(tmdb_id, credits);
                                }
                            }
                            self.dispatch(LibraryEvent::LookupApplied { target, matched: m });
                        }
                        None => {
                            self.set_status("Fetch failed");
                            self.show_message("TMDB", format!("Movie not found: {query}"));
                        }
                    }
                }
                TaskMsg::Credits { tmdb_id, credits } => {
                    self.credits.finish(tmdb_id, credits);
                }
                TaskMsg::Scanned { root, movies } => {
                    self.scan_in_flight = false;
                    info!("scan of {root} returned {} files", movies.len());
                    self.dispatch(LibraryEvent::Imported(movies));
                }
                TaskMsg::Error { what, error } => {
                    self.lookup_in_flight = false;
                    self.set_status(format!("Error: {error}"));
                    self.show_message(what, error);
                }
            }
        }
    }

    // ----- posters ----
    fn poster_key(&self, id: RecordId) -> Option<CacheKey> {
        self.library
            .get(id)
            .filter(|m| m.has_poster())
            .map(|m| CacheKey::new(m.poster_path.clone(), POSTER_SIZE))
    }

    /// Make sure the card for `id` has a poster slot for its current key,
    /// requesting one if the slot is missing or out of date.
    fn ensure_poster(&mut self, id: RecordId) {
        let key = self.poster_key(id);
        if self.posters.is_current(id, &key) {
            return;
        }
        let Some(movie) = self.library.get(id) else {
            return;
        };
        let slot = match &self.dispatcher {
            Some(d) => {
                d.request(id, movie, POSTER_SIZE);
                PosterSlot::Loading
            }
            None if key.is_some() => PosterSlot::Failed,
            None => PosterSlot::NoPoster,
        };
        self.posters.begin(id, key, slot);
    }

    /// Apply finished poster fetches. Deliveries for cards that are gone or
    /// now show a different poster are dropped.
    fn poll_posters(&mut self, ctx: &eg::Context) {
        let mut drained = 0usize;
        while drained < MAX_DELIVERIES_PER_FRAME {
            let delivery = match self.poster_rx.try_recv() {
                Ok(d) => d,
                Err(mpsc::TryRecvError::Empty | mpsc::TryRecvError::Disconnected) => break,
            };
            drained += 1;
            self.posters.deliver(delivery, |image, name| gfx::upload_poster(ctx, image, name));
        }

        if drained == MAX_DELIVERIES_PER_FRAME {
            ctx.request_repaint();
        }
    }

    /// Drop poster slots for cards that are no longer on screen.
    fn prune_posters(&mut self) {
        let keep: HashSet<RecordId> = self.library.poster_targets().into_iter().collect();
        self.posters.retain(&keep);
    }

    fn request_posters(&mut self) {
        for id in self.library.poster_targets() {
            self.ensure_poster(id);
        }
    }

    pub(crate) fn poster_texture(&self, id: RecordId) -> Option<&eg::TextureHandle> {
        self.posters.texture(id)
    }

    fn tick_search_debounce(&mut self, ctx: &eg::Context) {
        let Some(at) = self.search_edited_at else {
            return;
        };
        let waited = at.elapsed();
        if waited >= SEARCH_DEBOUNCE {
            self.search_edited_at = None;
            let text = self.search_text.clone();
            self.dispatch(LibraryEvent::SearchChanged(text));
            self.set_status(self.library.showing_label());
        } else {
            ctx.request_repaint_after(SEARCH_DEBOUNCE - waited);
        }
    }
}

fn visuals_for(dark: bool) -> eg::Visuals {
    if dark {
        eg::Visuals::dark()
    } else {
        eg::Visuals::light()
    }
}

// ========== App impl ==========
impl eframe::App for MovieCatApp {
    fn update(&mut self, ctx: &eg::Context, _frame: &mut eframe::Frame) {
        self.poll_posters(ctx);
        self.poll_tasks();
        self.tick_search_debounce(ctx);
        self.request_posters();

        eg::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            self.ui_render_topbar(ui, ctx);
            ui.add_space(4.0);
        });
        eg::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.ui_render_status(ui);
        });
        self.ui_render_detail_panel(ctx);
        eg::CentralPanel::default().show(ctx, |ui| {
            self.ui_render_grid(ui);
        });

        self.ui_render_delete_confirm(ctx);
        self.ui_render_message(ctx);

        self.prune_posters();
        if self.settings_save.due(Instant::now()) {
            self.flush_settings();
        } else if self.settings_save.is_dirty() {
            ctx.request_repaint_after(SETTINGS_DEBOUNCE);
        }
    }
}

impl Drop for MovieCatApp {
    fn drop(&mut self) {
        if self.settings_save.is_dirty() {
            self.flush_settings();
        }
        debug!("shutting down with data file {}", self.cfg.data_file.display());
    }
}
