use std::path::PathBuf;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::localization::Language;

const DEFAULT_STORAGE_PATH: &str = "anugya_patra.lmdb";
const DEFAULT_MAP_SIZE_MB: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// LMDB environment directory.
    pub storage_path: PathBuf,
    /// LMDB map size in bytes.
    pub map_size: usize,
    /// Language selected at startup.
    pub language: Language,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            map_size: DEFAULT_MAP_SIZE_MB * 1024 * 1024,
            language: Language::English,
        }
    }
}

impl AppConfig {
    /// Reads `ANUGYA_STORAGE_PATH`, `ANUGYA_MAP_SIZE_MB` and `ANUGYA_LANGUAGE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary lookup.
    /// Unset variables keep their default; unparsable ones are logged and
    /// keep their default too.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("ANUGYA_STORAGE_PATH").filter(|p| !p.trim().is_empty()) {
            config.storage_path = PathBuf::from(path);
        }

        if let Some(raw) = lookup("ANUGYA_MAP_SIZE_MB") {
            let bytes = raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|mb| *mb > 0)
                .and_then(|mb| mb.checked_mul(1024 * 1024));
            match bytes {
                Some(bytes) => config.map_size = bytes,
                None => warn!("Ignoring ANUGYA_MAP_SIZE_MB={raw}: expected a positive size in MiB"),
            }
        }

        if let Some(raw) = lookup("ANUGYA_LANGUAGE") {
            match raw.parse::<Language>() {
                Ok(language) => config.language = language,
                Err(e) => warn!("Ignoring ANUGYA_LANGUAGE: {e}"),
            }
        }

        config
    }

    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = path.into();
        self
    }
}
