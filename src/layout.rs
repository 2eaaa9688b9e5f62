//! On-disk layout of a book project and its metadata/TOC records.
//!
//! ```text
//! books/{slug}/
//! ├── metadata.yml
//! ├── toc.yml
//! ├── source/                    original EPUB
//! ├── content/chapters/          {NN-title}.md
//! ├── content/text/
//! ├── audio/{engine}/chapters/   {NN-title}.wav or {NN-title}_{NNN}.wav
//! └── processing/{logs,temp}/
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{NarratorError, Result};
use crate::extract::{BookMetadata, Chapter};

pub const METADATA_FILE: &str = "metadata.yml";
pub const TOC_FILE: &str = "toc.yml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub number: usize,
    pub title: String,
    pub filename: String,
    pub word_count: usize,
}

impl From<&Chapter> for TocEntry {
    fn from(chapter: &Chapter) -> Self {
        Self {
            number: chapter.number,
            title: chapter.title.clone(),
            filename: chapter.filename.clone(),
            word_count: chapter.word_count,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOfContents {
    pub chapters: Vec<TocEntry>,
}

impl TableOfContents {
    pub fn from_chapters(chapters: &[Chapter]) -> Self {
        Self {
            chapters: chapters.iter().map(TocEntry::from).collect(),
        }
    }

    pub fn get(&self, number: usize) -> Option<&TocEntry> {
        self.chapters.iter().find(|entry| entry.number == number)
    }

    pub fn total_words(&self) -> usize {
        self.chapters.iter().map(|entry| entry.word_count).sum()
    }
}

/// Paths of one book project, all derived from its root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookLayout {
    pub root: PathBuf,
    pub source: PathBuf,
    pub content: PathBuf,
    pub chapters: PathBuf,
    pub text: PathBuf,
    pub audio: PathBuf,
    pub processing: PathBuf,
    pub logs: PathBuf,
    pub temp: PathBuf,
}

impl BookLayout {
    /// Derive the layout of an existing or future project rooted at `root`.
    /// Nothing is touched on disk.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let content = root.join("content");
        let processing = root.join("processing");
        Self {
            source: root.join("source"),
            chapters: content.join("chapters"),
            text: content.join("text"),
            audio: root.join("audio"),
            logs: processing.join("logs"),
            temp: processing.join("temp"),
            content,
            processing,
            root,
        }
    }

    /// Derive the layout for `book_slug` under `books_dir` and create every
    /// directory, including the chapter audio directory of `engine`.
    /// Safe to call on an existing project.
    pub fn create(books_dir: &Path, book_slug: &str, engine: &str) -> Result<Self> {
        let layout = Self::at(books_dir.join(book_slug));
        for (_, dir) in layout.dirs() {
            fs::create_dir_all(dir)?;
        }
        layout.ensure_engine_dir(engine)?;
        log::debug!("Book layout ready at {}", layout.root.display());
        Ok(layout)
    }

    /// Logical directory names and their paths.
    pub fn dirs(&self) -> [(&'static str, &Path); 9] {
        [
            ("root", self.root.as_path()),
            ("source", self.source.as_path()),
            ("content", self.content.as_path()),
            ("chapters", self.chapters.as_path()),
            ("text", self.text.as_path()),
            ("audio", self.audio.as_path()),
            ("processing", self.processing.as_path()),
            ("logs", self.logs.as_path()),
            ("temp", self.temp.as_path()),
        ]
    }

    /// Chapter audio directory of one synthesis engine.
    pub fn engine_dir(&self, engine: &str) -> PathBuf {
        self.audio.join(engine).join("chapters")
    }

    pub fn ensure_engine_dir(&self, engine: &str) -> Result<PathBuf> {
        let dir = self.engine_dir(engine);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.root.join(METADATA_FILE)
    }

    pub fn toc_path(&self) -> PathBuf {
        self.root.join(TOC_FILE)
    }

    pub fn chapter_path(&self, filename: &str) -> PathBuf {
        self.chapters.join(format!("{}.md", filename))
    }

    /// Path of the combined audio file for a chapter.
    pub fn chapter_audio_path(&self, engine: &str, filename: &str) -> PathBuf {
        self.engine_dir(engine).join(format!("{}.wav", filename))
    }

    /// Write `metadata.yml` and `toc.yml`, replacing earlier versions.
    pub fn save_metadata(&self, metadata: &BookMetadata, chapters: &[Chapter]) -> Result<()> {
        fs::write(self.metadata_path(), serde_yaml::to_string(metadata)?)?;

        let toc = TableOfContents::from_chapters(chapters);
        fs::write(self.toc_path(), serde_yaml::to_string(&toc)?)?;
        Ok(())
    }

    /// Write one markdown file per chapter: a `# title` line, a blank line,
    /// then the normalized content. Files with the same name are overwritten.
    pub fn save_chapters(&self, chapters: &[Chapter]) -> Result<()> {
        let mut written = HashSet::new();

        for chapter in chapters {
            if !written.insert(chapter.filename.as_str()) {
                log::warn!(
                    "Chapter {} overwrites {}.md written by an earlier chapter",
                    chapter.number,
                    chapter.filename
                );
            }

            let path = self.chapter_path(&chapter.filename);
            fs::write(&path, format!("# {}\n\n{}", chapter.title, chapter.content))?;
        }

        Ok(())
    }

    pub fn load_toc(&self) -> Result<TableOfContents> {
        let path = self.toc_path();
        if !path.exists() {
            return Err(NarratorError::not_found("Table of contents", path));
        }
        Ok(serde_yaml::from_str(&fs::read_to_string(path)?)?)
    }

    pub fn load_metadata(&self) -> Result<BookMetadata> {
        let path = self.metadata_path();
        if !path.exists() {
            return Err(NarratorError::not_found("Book metadata", path));
        }
        Ok(serde_yaml::from_str(&fs::read_to_string(path)?)?)
    }

    pub fn read_chapter(&self, entry: &TocEntry) -> Result<String> {
        let path = self.chapter_path(&entry.filename);
        if !path.exists() {
            return Err(NarratorError::not_found("Chapter file", path));
        }
        Ok(fs::read_to_string(path)?)
    }
}
