//! Stat preset persistence
//!
//! The simulation never touches storage itself. Presets go through a
//! `PresetStore`, a plain string key-value seam, as JSON-encoded `Stats`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::sim::Stats;

/// Key prefix for stat presets
const KEY_PREFIX: &str = "spin_clash_stats_";

/// String key-value store
pub trait PresetStore {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError>;
    fn remove(&mut self, key: &str) -> Result<(), ConfigError>;
}

/// In-memory store (tests, headless runs)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PresetStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), ConfigError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per entry in a directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Keys are flattened to a safe file stem
    fn path_for(&self, key: &str) -> PathBuf {
        let stem: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{stem}.json"))
    }
}

impl PresetStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), ConfigError> {
        match std::fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Store `stats` under `name`
pub fn save_preset<S: PresetStore>(store: &mut S, name: &str, stats: &Stats) -> Result<(), ConfigError> {
    stats.validate()?;
    let json = serde_json::to_string_pretty(stats)?;
    store.set(&format!("{KEY_PREFIX}{name}"), &json)?;
    log::info!("Saved stat preset '{name}'");
    Ok(())
}

/// Load the preset called `name`; `Ok(None)` if it was never saved
pub fn load_preset<S: PresetStore>(store: &S, name: &str) -> Result<Option<Stats>, ConfigError> {
    let Some(json) = store.get(&format!("{KEY_PREFIX}{name}"))? else {
        return Ok(None);
    };
    let stats: Stats = serde_json::from_str(&json)?;
    stats.validate()?;
    Ok(Some(stats))
}

/// Load `name`, or fall back to defaults with a warning
pub fn load_preset_or_default<S: PresetStore>(store: &S, name: &str) -> Stats {
    match load_preset(store, name) {
        Ok(Some(stats)) => stats,
        Ok(None) => {
            log::info!("No stat preset '{name}', using defaults");
            Stats::default()
        }
        Err(e) => {
            log::warn!("Failed to load stat preset '{name}': {e}, using defaults");
            Stats::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom() -> Stats {
        Stats {
            attack: 120.0,
            defense: 35.0,
            weight: 1.4,
            ..Default::default()
        }
    }

    #[test]
    fn test_memory_store_preset() {
        let mut store = MemoryStore::new();
        assert_eq!(load_preset(&store, "heavy").unwrap(), None);

        save_preset(&mut store, "heavy", &custom()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(load_preset(&store, "heavy").unwrap(), Some(custom()));
    }

    #[test]
    fn test_partial_preset_fills_defaults() {
        let mut store = MemoryStore::new();
        store.set("spin_clash_stats_old", r#"{ "attack": 70.0 }"#).unwrap();
        let stats = load_preset(&store, "old").unwrap().unwrap();
        assert_eq!(stats.attack, 70.0);
        assert_eq!(stats.max_spin, Stats::default().max_spin);
    }

    #[test]
    fn test_invalid_preset_rejected() {
        let mut store = MemoryStore::new();
        let bad = Stats {
            max_spin: 0.0,
            ..Default::default()
        };
        assert!(save_preset(&mut store, "bad", &bad).is_err());
        assert!(store.is_empty());

        store.set("spin_clash_stats_bad", r#"{ "weight": -2.0 }"#).unwrap();
        assert!(load_preset(&store, "bad").is_err());
        assert_eq!(load_preset_or_default(&store, "bad"), Stats::default());
    }

    #[test]
    fn test_corrupt_json_falls_back() {
        let mut store = MemoryStore::new();
        store.set("spin_clash_stats_x", "{ not json").unwrap();
        assert!(matches!(load_preset(&store, "x"), Err(ConfigError::Json(_))));
        assert_eq!(load_preset_or_default(&store, "x"), Stats::default());
    }

    #[test]
    fn test_json_file_store() {
        let dir = std::env::temp_dir().join(format!("spin_clash_presets_{}", std::process::id()));
        let mut store = JsonFileStore::new(&dir);

        save_preset(&mut store, "player/1", &custom()).unwrap();
        assert!(dir.join("spin_clash_stats_player_1.json").exists());
        assert_eq!(load_preset(&store, "player/1").unwrap(), Some(custom()));

        store.remove("spin_clash_stats_player/1").unwrap();
        assert_eq!(load_preset(&store, "player/1").unwrap(), None);
        // Removing twice is fine
        store.remove("spin_clash_stats_player/1").unwrap();

        let _ = std::fs::remove_dir_all(&dir);
    }
}
