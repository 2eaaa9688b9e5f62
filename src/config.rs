use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{NarratorError, Result};

/// Runtime settings shared by the CLI commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root under which every book project lives (`{books_dir}/{slug}`).
    pub books_dir: PathBuf,
    /// Language code handed to the engine at construction (`a` = American English).
    pub lang_code: String,
    pub voice: String,
    /// Engine name; selects the `audio/{engine}/chapters` directory.
    pub engine: String,
    pub combine_segments: bool,
    pub comparisons_dir: PathBuf,
    pub samples_dir: PathBuf,
    /// Upper bound on the characters the engine renders per segment.
    pub chunk_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            books_dir: PathBuf::from("books"),
            lang_code: "a".to_string(),
            voice: crate::engine::DEFAULT_VOICE.to_string(),
            engine: crate::engine::espeak::ENGINE_NAME.to_string(),
            combine_segments: true,
            comparisons_dir: PathBuf::from("voice_comparisons"),
            samples_dir: PathBuf::from("voice_samples"),
            chunk_chars: 400,
        }
    }
}

impl Config {
    /// Load settings from a JSON file, or fall back to defaults when no path is given.
    ///
    /// Missing keys in the file keep their default values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        if !path.exists() {
            return Err(NarratorError::not_found("Config file", path));
        }

        let raw = fs::read_to_string(path)?;
        let config = serde_json::from_str(&raw)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn no_path_gives_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.books_dir, PathBuf::from("books"));
        assert_eq!(config.voice, "af_heart");
        assert!(config.combine_segments);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("narrator.json");
        fs::write(&path, r#"{ "voice": "af_bella", "combine_segments": false }"#).unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.voice, "af_bella");
        assert!(!config.combine_segments);
        assert_eq!(config.lang_code, "a");
        assert_eq!(config.chunk_chars, 400);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(matches!(err, NarratorError::NotFound { .. }));
    }
}
