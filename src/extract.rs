use html2text::render::text_renderer::TrivialDecorator;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::container::{EpubDocSource, EpubSource, UnitKind, DC_NAMESPACE};
use crate::error::{NarratorError, Result};
use crate::text::{chapter_filename, word_count, TextNormalizer};

// Wide enough that html2text never wraps a paragraph.
const TEXT_WIDTH: usize = 10_000;

/// Descriptive metadata of a converted book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMetadata {
    pub title: String,
    pub author: String,
    pub language: String,
    pub publisher: String,
    pub description: String,
    /// Project directory name, assigned once the book is converted.
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub number: usize,
    pub title: String,
    pub filename: String,
    pub content: String,
    /// Token count of the text before normalization.
    pub word_count: usize,
}

/// Walks the documents of an EPUB and turns each non-empty one into a [`Chapter`].
pub struct ChapterExtractor {
    normalizer: TextNormalizer,
    title_regex: Regex,
}

impl Default for ChapterExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ChapterExtractor {
    pub fn new() -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            title_regex: Regex::new(r"(?is)<(?:h[1-3]|title)\b[^>]*>(.*?)</(?:h[1-3]|title)\s*>")
                .unwrap(),
        }
    }

    /// Open the EPUB at `epub_path` and extract its metadata and chapters.
    pub fn extract(&self, epub_path: &Path) -> Result<(BookMetadata, Vec<Chapter>)> {
        let mut source = EpubDocSource::open(epub_path)?;
        self.extract_from(&mut source, epub_path)
    }

    /// Extract from an already opened container. `origin` names it in errors.
    pub fn extract_from(
        &self,
        source: &mut dyn EpubSource,
        origin: &Path,
    ) -> Result<(BookMetadata, Vec<Chapter>)> {
        let metadata = read_metadata(source);
        let mut chapters = Vec::new();

        for unit in source.units()? {
            if unit.kind != UnitKind::Document {
                continue;
            }

            let raw_text = markup_to_text(&unit.markup);
            if raw_text.trim().is_empty() {
                log::debug!("Skipping {}: no text content", unit.id);
                continue;
            }

            let number = chapters.len() + 1;
            let title = self
                .extract_title(&unit.markup)
                .unwrap_or_else(|| format!("Chapter {}", number));

            chapters.push(Chapter {
                number,
                filename: chapter_filename(number, &title),
                content: self.normalizer.normalize(&raw_text),
                word_count: word_count(&raw_text),
                title,
            });
        }

        if chapters.is_empty() {
            return Err(NarratorError::NoChapters(origin.to_path_buf()));
        }

        log::info!(
            "Extracted {} chapters from {}",
            chapters.len(),
            origin.display()
        );
        Ok((metadata, chapters))
    }

    /// Text of the first `h1`-`h3` or `title` element, if it has any.
    fn extract_title(&self, markup: &str) -> Option<String> {
        let inner = self.title_regex.captures(markup)?.get(1)?.as_str();
        let title = markup_to_text(inner).trim().to_string();
        (!title.is_empty()).then_some(title)
    }
}

fn markup_to_text(markup: &str) -> String {
    html2text::from_read_with_decorator(markup.as_bytes(), TEXT_WIDTH, TrivialDecorator::new())
}

fn read_metadata(source: &dyn EpubSource) -> BookMetadata {
    let field = |name: &str, fallback: &str| {
        source
            .metadata(DC_NAMESPACE, name)
            .unwrap_or_else(|| fallback.to_string())
    };

    BookMetadata {
        title: field("title", "Unknown"),
        author: field("creator", "Unknown"),
        language: field("language", "en"),
        publisher: field("publisher", "Unknown"),
        description: field("description", ""),
        slug: String::new(),
    }
}
