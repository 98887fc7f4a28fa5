//! Best score persistence
//!
//! A single integer survives between runs. The session reads it once at construction
//! and writes it whenever the live score beats it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::HighScoreError;

/// Where the best score lives
pub trait HighScoreStore {
    /// Stored best score (0 when nothing has been saved)
    fn load(&self) -> Result<u64, HighScoreError>;
    fn save(&mut self, score: u64) -> Result<(), HighScoreError>;
}

/// Volatile store, for tests and runs without a save location
#[derive(Debug, Clone, Default)]
pub struct MemoryHighScore {
    pub best: u64,
}

impl MemoryHighScore {
    pub fn new(best: u64) -> Self {
        Self { best }
    }
}

impl HighScoreStore for MemoryHighScore {
    fn load(&self) -> Result<u64, HighScoreError> {
        Ok(self.best)
    }

    fn save(&mut self, score: u64) -> Result<(), HighScoreError> {
        self.best = score;
        Ok(())
    }
}

/// On-disk record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct HighScoreRecord {
    best: u64,
}

/// JSON file store
#[derive(Debug, Clone)]
pub struct JsonFileHighScore {
    path: PathBuf,
}

impl JsonFileHighScore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> HighScoreError {
        HighScoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl HighScoreStore for JsonFileHighScore {
    fn load(&self) -> Result<u64, HighScoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => {
                let record: HighScoreRecord = serde_json::from_str(&json)?;
                log::info!("Loaded high score {}", record.best);
                Ok(record.best)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No high score found, starting fresh");
                Ok(0)
            }
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&mut self, score: u64) -> Result<(), HighScoreError> {
        let json = serde_json::to_string(&HighScoreRecord { best: score })?;
        std::fs::write(&self.path, json).map_err(|e| self.io_error(e))?;
        log::debug!("High score saved ({})", score);
        Ok(())
    }
}
