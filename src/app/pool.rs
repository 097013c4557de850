// src/app/pool.rs
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tracing::{debug, warn};

pub type Job = Box<dyn FnOnce() + Send + 'static>;

pub const DEFAULT_WORKERS: usize = 8;

/// Fixed set of threads pulling jobs off one shared queue.
///
/// Dropping the pool closes the queue; workers finish the job they hold and
/// exit without being joined.
pub struct WorkerPool {
    work_tx: Option<Sender<Job>>,
    handles: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.handles.len())
            .finish()
    }
}

impl WorkerPool {
    pub fn new(workers: usize, name: &str) -> Self {
        let (work_tx, work_rx) = mpsc::channel::<Job>();
        let work_rx = Arc::new(Mutex::new(work_rx));

        let mut handles = Vec::new();
        for i in 0..workers.clamp(1, 32) {
            let work_rx = Arc::clone(&work_rx);
            let spawned = std::thread::Builder::new()
                .name(format!("{name}-{i}"))
                .spawn(move || loop {
                    let job = {
                        let rx = match work_rx.lock() {
                            Ok(rx) => rx,
                            Err(poisoned) => poisoned.into_inner(),
                        };
                        rx.recv()
                    };
                    match job {
                        Ok(job) => job(),
                        Err(_) => break,
                    }
                });
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => warn!("failed to spawn worker {name}-{i}: {e}"),
            }
        }
        debug!("{name} pool started with {} workers", handles.len());

        Self {
            work_tx: Some(work_tx),
            handles,
        }
    }

    pub fn workers(&self) -> usize {
        self.handles.len()
    }

    /// Queue a job. Returns false if the pool has no live workers.
    pub fn submit<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if self.handles.is_empty() {
            return false;
        }
        match &self.work_tx {
            Some(tx) => tx.send(Box::new(job)).is_ok(),
            None => false,
        }
    }

    /// Close the queue and wait for queued jobs to drain.
    pub fn join(mut self) {
        self.work_tx.take();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.work_tx.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn runs_every_submitted_job() {
        let pool = WorkerPool::new(4, "test");
        assert_eq!(pool.workers(), 4);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..50 {
            let c = Arc::clone(&counter);
            assert!(pool.submit(move || {
                c.fetch_add(1, Ordering::SeqCst);
            }));
        }
        pool.join();
        assert_eq!(counter.load(Ordering::SeqCst), 50);
    }

    #[test]
    fn worker_count_is_clamped() {
        let pool = WorkerPool::new(0, "tiny");
        assert_eq!(pool.workers(), 1);
        pool.join();
    }
}
