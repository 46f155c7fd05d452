//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Paths to all Fyle data directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// SQLite database directory (`data/db/`).
    pub db: PathBuf,
    /// Exported share payloads (`data/exports/`).
    pub exports: PathBuf,
    /// Extractor tuning (`data/extractor.json`).
    pub extractor_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            db: root.join("db"),
            exports: root.join("exports"),
            extractor_file: root.join("extractor.json"),
            root,
        };
        paths.ensure_dirs()?;
        Ok(paths)
    }

    fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.db)?;
        std::fs::create_dir_all(&self.exports)?;
        Ok(())
    }
}

/// Top-level Fyle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FyleConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Local hour (0-23) at which day-granular reminders fire.
    pub reminder_hour: u32,
    /// Interval between background reminder scans.
    pub reminder_scan_secs: u64,
    /// Heuristic extraction limits.
    pub extractor: ExtractorSettings,
}

impl FyleConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3004);

        let reminder_hour = std::env::var("FYLE_REMINDER_HOUR")
            .ok()
            .and_then(|h| h.parse::<u32>().ok())
            .filter(|h| *h < 24)
            .unwrap_or(9);

        let reminder_scan_secs = std::env::var("FYLE_REMINDER_SCAN_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|s| *s > 0)
            .unwrap_or(300);

        let data_paths = DataPaths::new(data_dir)?;
        let extractor = ExtractorSettings::load(&data_paths.extractor_file);

        Ok(Self {
            port,
            data_paths,
            reminder_hour,
            reminder_scan_secs,
            extractor,
        })
    }
}

/// Tunable limits for the heuristic field extractor.
///
/// Every field has a default, so a partial `extractor.json` only overrides
/// what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorSettings {
    /// Dates older than `now - past_tolerance_days` are treated as OCR noise.
    pub past_tolerance_days: i64,
    /// Characters of context inspected before a detected date.
    pub context_before: usize,
    /// Characters of context inspected after a detected date.
    pub context_after: usize,
    /// Maximum number of categories assigned to one document.
    pub max_categories: usize,
    /// Maximum summary key length, in characters.
    pub max_key_chars: usize,
    /// Maximum summary value length, in characters.
    pub max_value_chars: usize,
    /// Maximum length of a title taken from the first line.
    pub max_title_chars: usize,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            past_tolerance_days: 30,
            context_before: 100,
            context_after: 200,
            max_categories: 2,
            max_key_chars: 30,
            max_value_chars: 100,
            max_title_chars: 50,
        }
    }
}

impl ExtractorSettings {
    /// Load settings from a JSON file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(settings) => {
                    info!("Loaded extractor settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    warn!("Ignoring malformed {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}
