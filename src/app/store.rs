// src/app/store.rs
//! On-disk collection and settings files.
//!
//! Loads never fail: a missing or broken file degrades to an empty list (or
//! default settings). Saves go through a temp file in the destination
//! directory and are renamed into place only after a full, synced write.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::app::data::Movie;
use crate::app::error::PersistError;
use crate::app::prefs::Settings;

#[derive(Clone, Debug)]
pub struct CollectionStore {
    data_path: PathBuf,
    settings_path: PathBuf,
}

impl CollectionStore {
    pub fn new(data_path: impl Into<PathBuf>, settings_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            settings_path: settings_path.into(),
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn load(&self) -> Vec<Movie> {
        let Some(root) = read_json(&self.data_path) else {
            return Vec::new();
        };
        let Value::Array(items) = root else {
            warn!(
                "{} is not a JSON array; starting with an empty collection",
                self.data_path.display()
            );
            return Vec::new();
        };

        let total = items.len();
        let movies: Vec<Movie> = items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| match Movie::from_json(item) {
                Ok(m) => Some(m),
                Err(e) => {
                    warn!("skipping collection entry #{i}: {e}");
                    None
                }
            })
            .collect();
        info!(
            "loaded {} of {total} movies from {}",
            movies.len(),
            self.data_path.display()
        );
        movies
    }

    pub fn save(&self, movies: &[Movie]) -> Result<(), PersistError> {
        let body = serde_json::to_vec_pretty(movies)?;
        write_atomic(&self.data_path, |w| w.write_all(&body))?;
        debug!("saved {} movies to {}", movies.len(), self.data_path.display());
        Ok(())
    }

    pub fn load_settings(&self) -> Settings {
        match read_json(&self.settings_path) {
            Some(v) => Settings::from_json(&v),
            None => Settings::default(),
        }
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), PersistError> {
        let body = serde_json::to_vec_pretty(settings)?;
        write_atomic(&self.settings_path, |w| w.write_all(&body))
    }
}

fn read_json(path: &Path) -> Option<Value> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("{} not found; using defaults", path.display());
            return None;
        }
        Err(e) => {
            warn!("failed to read {}: {e}", path.display());
            return None;
        }
    };
    match serde_json::from_slice(&raw) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("failed to parse {} ({e}); using defaults", path.display());
            None
        }
    }
}

/// Write `dest` all-or-nothing. `fill` streams the content into a temp file
/// next to `dest`; on any error the temp file is removed and `dest` is left
/// as it was.
pub fn write_atomic<F>(dest: &Path, fill: F) -> Result<(), PersistError>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let io_err = |source| PersistError::Io {
        path: dest.to_path_buf(),
        source,
    };

    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(io_err)?;

    let tmp = NamedTempFile::new_in(&dir).map_err(io_err)?;
    {
        let mut w = BufWriter::new(tmp.as_file());
        fill(&mut w).map_err(io_err)?;
        w.flush().map_err(io_err)?;
    }
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(dest).map_err(|e| io_err(e.error))?;
    Ok(())
}
