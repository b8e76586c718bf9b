//! Configuration for namedeck

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default storage directory
pub fn default_storage_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("namedeck")
}

/// Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Storage directory for the progress database
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,

    /// Correct answers required before a name counts as mastered
    #[serde(default = "default_mastery_threshold")]
    pub mastery_threshold: u32,

    /// Rolling window in days within which the last correct answer must fall
    /// for a name to stay mastered
    #[serde(default = "default_mastery_window_days")]
    pub mastery_window_days: i64,

    /// Feedback delay after a correct answer, in milliseconds
    #[serde(default = "default_correct_delay_ms")]
    pub correct_delay_ms: u64,

    /// Feedback delay after an incorrect answer, in milliseconds (longer, so
    /// the highlighted correct answer can be read)
    #[serde(default = "default_incorrect_delay_ms")]
    pub incorrect_delay_ms: u64,

    /// Total answer options per card, the asked person included
    #[serde(default = "default_option_count")]
    pub option_count: usize,
}

fn default_mastery_threshold() -> u32 {
    3
}

fn default_mastery_window_days() -> i64 {
    30
}

fn default_correct_delay_ms() -> u64 {
    1500
}

fn default_incorrect_delay_ms() -> u64 {
    2500
}

fn default_option_count() -> usize {
    4
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            mastery_threshold: default_mastery_threshold(),
            mastery_window_days: default_mastery_window_days(),
            correct_delay_ms: default_correct_delay_ms(),
            incorrect_delay_ms: default_incorrect_delay_ms(),
            option_count: default_option_count(),
        }
    }
}

impl Config {
    /// Load config from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Save config to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), std::io::Error> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Get progress database path
    pub fn db_path(&self) -> PathBuf {
        self.storage_dir.join("progress.sled")
    }

    /// Get config file path
    pub fn config_path(&self) -> PathBuf {
        self.storage_dir.join("config.toml")
    }
}
