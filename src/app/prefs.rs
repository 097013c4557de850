// src/app/prefs.rs
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::app::types::{FilterMode, SortKey};

/// UI preferences persisted next to the collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub dark_mode: bool,
    pub sort: SortKey,
    pub filter: FilterMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dark_mode: true,
            sort: SortKey::default(),
            filter: FilterMode::default(),
        }
    }
}

impl Settings {
    /// Each field is read on its own; a bad field keeps its default.
    pub fn from_json(value: &Value) -> Self {
        let mut out = Self::default();
        let Some(obj) = value.as_object() else {
            warn!("settings file is not an object; using defaults");
            return out;
        };

        match obj.get("dark_mode") {
            Some(Value::Bool(b)) => out.dark_mode = *b,
            Some(other) => warn!("ignoring dark_mode = {other}"),
            None => {}
        }
        if let Some(v) = obj.get("sort") {
            match SortKey::deserialize(v) {
                Ok(k) => out.sort = k,
                Err(_) => warn!("ignoring sort = {v}"),
            }
        }
        if let Some(v) = obj.get("filter") {
            match FilterMode::deserialize(v) {
                Ok(f) => out.filter = f,
                Err(_) => warn!("ignoring filter = {v}"),
            }
        }
        out
    }
}

/// Coalesces settings writes so a burst of toggles costs one save.
#[derive(Debug)]
pub struct SaveDebounce {
    dirty: bool,
    last_write: Instant,
    delay: Duration,
}

impl SaveDebounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            dirty: false,
            last_write: Instant::now(),
            delay,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// True once per burst, after the delay has passed since the last write.
    pub fn due(&mut self, now: Instant) -> bool {
        if self.dirty && now.duration_since(self.last_write) >= self.delay {
            self.dirty = false;
            self.last_write = now;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fields_fall_back_independently() {
        let s = Settings::from_json(&json!({
            "dark_mode": "nope",
            "sort": "year",
            "filter": "sideways",
        }));
        assert!(s.dark_mode);
        assert_eq!(s.sort, SortKey::Year);
        assert_eq!(s.filter, FilterMode::All);

        let s = Settings::from_json(&json!({"dark_mode": false}));
        assert_eq!(
            s,
            Settings {
                dark_mode: false,
                ..Settings::default()
            }
        );
        assert_eq!(Settings::from_json(&json!([1, 2])), Settings::default());
    }

    #[test]
    fn serialized_shape_is_stable() {
        let s = Settings {
            dark_mode: true,
            sort: SortKey::Rating,
            filter: FilterMode::Favorites,
        };
        assert_eq!(
            serde_json::to_value(&s).unwrap(),
            json!({"dark_mode": true, "sort": "rating", "filter": "favorites"})
        );
    }

    #[test]
    fn debounce_fires_once_per_burst() {
        let start = Instant::now();
        let mut d = SaveDebounce::new(Duration::from_millis(300));
        assert!(!d.due(start + Duration::from_secs(1)));
        d.mark_dirty();
        d.mark_dirty();
        assert!(d.is_dirty());
        let t = start + Duration::from_secs(1);
        assert!(d.due(t));
        assert!(!d.due(t + Duration::from_secs(1)));
        d.mark_dirty();
        assert!(!d.due(t + Duration::from_millis(100)));
        assert!(d.due(t + Duration::from_millis(400)));
    }
}
