use std::path::PathBuf;

/// Errors surfaced by the conversion and narration pipeline.
#[derive(thiserror::Error, Debug)]
pub enum NarratorError {
    #[error("{what} not found: {}", .path.display())]
    NotFound { what: &'static str, path: PathBuf },
    #[error("Invalid {what}: [{}]", .invalid.join(", "))]
    Validation {
        what: &'static str,
        invalid: Vec<String>,
    },
    #[error("TTS initialization failed: {0}")]
    EngineInit(String),
    #[error("Speech generation failed: {0}")]
    Generation(String),
    #[error("Failed to read EPUB: {0}")]
    Epub(String),
    #[error("No chapters with text content found in {}", .0.display())]
    NoChapters(PathBuf),
    #[error("{0}")]
    EmptyInput(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

impl NarratorError {
    pub(crate) fn not_found(what: &'static str, path: impl Into<PathBuf>) -> Self {
        Self::NotFound {
            what,
            path: path.into(),
        }
    }

    /// Engine initialization is the only condition that must stop the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::EngineInit(_))
    }
}

pub type Result<T> = std::result::Result<T, NarratorError>;
