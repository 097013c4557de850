// src/app/fetch.rs
//! Poster fetch dispatcher.
//!
//! Cache hits and "no poster" answers are posted straight onto the delivery
//! channel; misses run on the worker pool (fetch, decode, fit, cache) and post
//! their outcome on the same channel. The UI drains it on its own thread, so
//! workers never touch widgets.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::app::cache::{CacheKey, PosterImage, SharedCache, TargetSize};
use crate::app::catalog::ImageSource;
use crate::app::data::Movie;
use crate::app::gfx::decode_and_fit;
use crate::app::pool::WorkerPool;
use crate::app::types::{PosterDelivery, PosterOutcome, RecordId};

pub type Waker = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestKind {
    NoPoster,
    CacheHit,
    Scheduled,
    /// The pool refused the job; a failure was posted instead.
    Rejected,
}

pub struct PosterDispatcher {
    cache: SharedCache<CacheKey, PosterImage>,
    source: Arc<dyn ImageSource>,
    pool: Arc<WorkerPool>,
    done_tx: Sender<PosterDelivery>,
    wake: Waker,
}

impl std::fmt::Debug for PosterDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PosterDispatcher")
            .field("cached", &self.cache.len())
            .field("pool", &self.pool)
            .finish()
    }
}

impl PosterDispatcher {
    pub fn new(
        cache: SharedCache<CacheKey, PosterImage>,
        source: Arc<dyn ImageSource>,
        pool: Arc<WorkerPool>,
        done_tx: Sender<PosterDelivery>,
        wake: Waker,
    ) -> Self {
        Self {
            cache,
            source,
            pool,
            done_tx,
            wake,
        }
    }

    pub fn cache(&self) -> &SharedCache<CacheKey, PosterImage> {
        &self.cache
    }

    pub fn request(&self, target: RecordId, movie: &Movie, size: TargetSize) -> RequestKind {
        if !movie.has_poster() {
            post(&self.done_tx, &self.wake, PosterDelivery {
                target,
                key: None,
                outcome: PosterOutcome::NoPoster,
            });
            return RequestKind::NoPoster;
        }

        let key = CacheKey::new(movie.poster_path.clone(), size);
        if let Some(image) = self.cache.get(&key) {
            trace!("poster cache hit {}", key.poster);
            post(&self.done_tx, &self.wake, PosterDelivery {
                target,
                key: Some(key),
                outcome: PosterOutcome::Ready(image),
            });
            return RequestKind::CacheHit;
        }

        let cache = self.cache.clone();
        let source = Arc::clone(&self.source);
        let done_tx = self.done_tx.clone();
        let wake = Arc::clone(&self.wake);
        let job_key = key.clone();

        let queued = self.pool.submit(move || {
            let outcome = match fetch_poster(source.as_ref(), &job_key) {
                Ok(image) => {
                    cache.put(job_key.clone(), Arc::clone(&image));
                    PosterOutcome::Ready(image)
                }
                Err(e) => {
                    warn!("poster {} failed: {e}", job_key.poster);
                    PosterOutcome::Failed(e)
                }
            };
            post(&done_tx, &wake, PosterDelivery {
                target,
                key: Some(job_key),
                outcome,
            });
        });

        if queued {
            debug!("poster {} scheduled for {:?}", key.poster, target);
            RequestKind::Scheduled
        } else {
            post(&self.done_tx, &self.wake, PosterDelivery {
                target,
                key: Some(key),
                outcome: PosterOutcome::Failed("worker pool unavailable".into()),
            });
            RequestKind::Rejected
        }
    }
}

fn fetch_poster(source: &dyn ImageSource, key: &CacheKey) -> Result<PosterImage, String> {
    let bytes = source.image_bytes(&key.poster).map_err(|e| e.to_string())?;
    let image = decode_and_fit(&bytes, key.size)?;
    Ok(Arc::new(image))
}

// A closed receiver means the UI is gone; dropping the result is correct.
fn post(tx: &Sender<PosterDelivery>, wake: &Waker, delivery: PosterDelivery) {
    if tx.send(delivery).is_ok() {
        wake();
    }
}
