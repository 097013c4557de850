use std::path::{Path, PathBuf};
use std::{env, fs};

use serde::Deserialize;
use tracing::{info, warn};

use crate::app::cache::DEFAULT_CAPACITY;
use crate::app::catalog::DEFAULT_CAST_LIMIT;
use crate::app::pool::DEFAULT_WORKERS;

pub const CONFIG_FILE: &str = "config.json";
pub const API_KEY_ENV: &str = "MOVIECAT_TMDB_API_KEY";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub tmdb_api_key: Option<String>,
    pub api_base_url: String,
    pub image_base_url: String,
    pub data_file: PathBuf,
    pub settings_file: PathBuf,
    pub worker_count: usize,
    pub cache_capacity: usize,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub cast_limit: usize,
    pub library_roots: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tmdb_api_key: None,
            api_base_url: "https://api.themoviedb.org/3".into(),
            image_base_url: "https://image.tmdb.org/t/p/w300".into(),
            data_file: PathBuf::from("movies_data.json"),
            settings_file: PathBuf::from("settings.json"),
            worker_count: DEFAULT_WORKERS,
            cache_capacity: DEFAULT_CAPACITY,
            connect_timeout_secs: 4,
            read_timeout_secs: 10,
            cast_limit: DEFAULT_CAST_LIMIT,
            library_roots: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(alias = "api_key")]
    tmdb_api_key: Option<String>,
    api_base_url: Option<String>,
    image_base_url: Option<String>,
    data_file: Option<PathBuf>,
    settings_file: Option<PathBuf>,
    worker_count: Option<usize>,
    cache_capacity: Option<usize>,
    connect_timeout_secs: Option<u64>,
    read_timeout_secs: Option<u64>,
    cast_limit: Option<usize>,
    library_roots: Option<Vec<String>>,
}

impl AppConfig {
    fn merge(&mut self, raw: RawConfig) {
        if raw.tmdb_api_key.is_some() {
            self.tmdb_api_key = raw.tmdb_api_key;
        }
        if let Some(url) = raw.api_base_url.filter(|s| !s.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(url) = raw.image_base_url.filter(|s| !s.trim().is_empty()) {
            self.image_base_url = url;
        }
        if let Some(p) = raw.data_file {
            self.data_file = p;
        }
        if let Some(p) = raw.settings_file {
            self.settings_file = p;
        }
        if let Some(n) = raw.worker_count {
            self.worker_count = n;
        }
        if let Some(n) = raw.cache_capacity {
            self.cache_capacity = n;
        }
        if let Some(s) = raw.connect_timeout_secs {
            self.connect_timeout_secs = s;
        }
        if let Some(s) = raw.read_timeout_secs {
            self.read_timeout_secs = s;
        }
        if let Some(n) = raw.cast_limit {
            self.cast_limit = n;
        }
        if let Some(list) = raw.library_roots {
            self.library_roots = list;
        }
    }

    fn clamp(&mut self) {
        self.worker_count = self.worker_count.clamp(1, 32);
        self.cache_capacity = self.cache_capacity.max(1);
        self.cast_limit = self.cast_limit.clamp(1, 50);
        self.connect_timeout_secs = self.connect_timeout_secs.clamp(1, 60);
        self.read_timeout_secs = self.read_timeout_secs.clamp(1, 300);
    }
}

/// `config.json` in the working directory, then the API key from the environment.
pub fn load_config() -> AppConfig {
    let env_key = env::var(API_KEY_ENV).ok();
    load_config_from(Path::new(CONFIG_FILE), env_key)
}

pub fn load_config_from(path: &Path, env_key: Option<String>) -> AppConfig {
    let mut cfg = AppConfig::default();

    match fs::read_to_string(path) {
        Ok(raw) => match serde_json::from_str::<RawConfig>(&raw) {
            Ok(parsed) => {
                cfg.merge(parsed);
                info!("Loaded config from {}", path.display());
            }
            Err(err) => {
                warn!("Failed to parse {} ({}). Using defaults.", path.display(), err);
            }
        },
        Err(_) => {
            info!("No {} found; using defaults", path.display());
        }
    }

    if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
        cfg.tmdb_api_key = Some(key);
    }
    if cfg.tmdb_api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
        warn!("No TMDB API key (set {API_KEY_ENV} or tmdb_api_key); auto-fetch and posters are disabled");
    }

    cfg.clamp();
    cfg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.json"), None);
        assert_eq!(cfg.worker_count, 8);
        assert_eq!(cfg.cache_capacity, 256);
        assert_eq!(cfg.cast_limit, 5);
        assert_eq!(cfg.data_file, PathBuf::from("movies_data.json"));
        assert!(cfg.tmdb_api_key.is_none());
    }

    #[test]
    fn file_values_merge_and_clamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"api_key":"abc","worker_count":500,"cache_capacity":0,"library_roots":["/films"]}"#,
        )
        .unwrap();
        let cfg = load_config_from(&path, None);
        assert_eq!(cfg.tmdb_api_key.as_deref(), Some("abc"));
        assert_eq!(cfg.worker_count, 32);
        assert_eq!(cfg.cache_capacity, 1);
        assert_eq!(cfg.library_roots, vec!["/films".to_string()]);
        assert_eq!(cfg.read_timeout_secs, 10);
    }

    #[test]
    fn env_key_wins_and_bad_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ nope").unwrap();
        let cfg = load_config_from(&path, Some("from-env".into()));
        assert_eq!(cfg.tmdb_api_key.as_deref(), Some("from-env"));
        assert_eq!(cfg.worker_count, 8);

        let cfg = load_config_from(&path, Some("  ".into()));
        assert!(cfg.tmdb_api_key.is_none());
    }
}
