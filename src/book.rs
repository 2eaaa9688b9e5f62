//! Book-level workflows: EPUB conversion, chapter listing and chapter narration.

use std::fs;
use std::path::{Path, PathBuf};

use crate::audio::SpeechGenerator;
use crate::engine::{validate_voices, SynthesisEngine};
use crate::error::{NarratorError, Result};
use crate::extract::{BookMetadata, ChapterExtractor};
use crate::layout::{BookLayout, TableOfContents, TocEntry};
use crate::report::Reporter;
use crate::text::slugify;

/// Result of converting an EPUB into a book project.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub layout: BookLayout,
    pub metadata: BookMetadata,
    pub toc: TableOfContents,
    /// Where the source EPUB was copied, `None` if it was already in place.
    pub copied_source: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ChapterListing {
    pub entry: TocEntry,
    /// Whether combined audio exists; `None` when audio status was not requested.
    pub has_audio: Option<bool>,
}

#[derive(Debug)]
pub struct ChapterAudio {
    pub number: usize,
    pub title: String,
    pub files: Vec<PathBuf>,
    pub error: Option<NarratorError>,
}

impl ChapterAudio {
    pub fn succeeded(&self) -> bool {
        self.error.is_none() && !self.files.is_empty()
    }
}

/// Options for [`generate_audio`].
#[derive(Debug, Clone)]
pub struct AudioRequest<'r> {
    pub chapters: &'r [usize],
    pub voice: &'r str,
    pub combine_segments: bool,
}

/// Converts EPUBs into projects under `books_dir` and narrates their chapters.
pub struct BookProcessor {
    books_dir: PathBuf,
    extractor: ChapterExtractor,
}

impl BookProcessor {
    pub fn new(books_dir: impl Into<PathBuf>) -> Self {
        Self {
            books_dir: books_dir.into(),
            extractor: ChapterExtractor::new(),
        }
    }

    /// Convert `epub_path` into `{books_dir}/{slug}`. The slug defaults to
    /// the slug of `book_title`. `engine` names the audio directory prepared
    /// for later narration.
    pub fn convert(
        &self,
        epub_path: &Path,
        book_title: &str,
        book_slug: Option<&str>,
        engine: &str,
    ) -> Result<Conversion> {
        if !epub_path.exists() {
            return Err(NarratorError::not_found("EPUB file", epub_path));
        }

        let slug = project_slug(epub_path, book_title, book_slug)?;
        log::info!("📚 Converting {} into book '{}'", epub_path.display(), slug);

        let layout = BookLayout::create(&self.books_dir, &slug, engine)?;
        let copied_source = copy_source(epub_path, &layout)?;

        let (mut metadata, chapters) = self.extractor.extract(epub_path)?;
        metadata.slug = slug;

        layout.save_metadata(&metadata, &chapters)?;
        layout.save_chapters(&chapters)?;

        log::info!(
            "✅ Converted {} chapters into {}",
            chapters.len(),
            layout.root.display()
        );
        Ok(Conversion {
            toc: TableOfContents::from_chapters(&chapters),
            layout,
            metadata,
            copied_source,
        })
    }
}

/// Directory name for a new project: the explicit slug, else the slug of
/// the title, else the slug of the EPUB file stem. It must name a single
/// directory below `books_dir`.
fn project_slug(epub_path: &Path, book_title: &str, book_slug: Option<&str>) -> Result<String> {
    let slug = match book_slug {
        Some(slug) => slug.trim().to_string(),
        None => {
            let from_title = slugify(book_title);
            if from_title.is_empty() {
                let stem = epub_path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default();
                log::warn!("Title '{}' has no usable slug, using the file name", book_title);
                slugify(&stem)
            } else {
                from_title
            }
        }
    };

    if slug.is_empty() || slug == "." || slug == ".." || slug.contains(['/', '\\']) {
        return Err(NarratorError::Validation {
            what: "book slug",
            invalid: vec![slug],
        });
    }
    Ok(slug)
}

/// Copy the EPUB into `source/` unless it already is that file.
fn copy_source(epub_path: &Path, layout: &BookLayout) -> Result<Option<PathBuf>> {
    let file_name = epub_path
        .file_name()
        .ok_or_else(|| NarratorError::not_found("EPUB file", epub_path))?;
    let target = layout.source.join(file_name);

    let same_file = match (fs::canonicalize(epub_path), fs::canonicalize(&target)) {
        (Ok(from), Ok(to)) => from == to,
        _ => false,
    };
    if same_file {
        log::info!("📄 EPUB already in place: {}", target.display());
        return Ok(None);
    }

    fs::copy(epub_path, &target)?;
    log::info!("📄 Copied EPUB to: {}", target.display());
    Ok(Some(target))
}

/// Open an existing book project, failing if its directory is missing.
pub fn open_book(book_path: &Path) -> Result<BookLayout> {
    if !book_path.is_dir() {
        return Err(NarratorError::not_found("Book directory", book_path));
    }
    Ok(BookLayout::at(book_path))
}

/// Metadata and chapter entries of a converted book. With `show_audio`, each
/// entry reports whether `audio/{engine}/chapters/{filename}.wav` exists.
pub fn list_chapters(
    book_path: &Path,
    show_audio: bool,
    engine: &str,
) -> Result<(BookMetadata, Vec<ChapterListing>)> {
    let layout = open_book(book_path)?;
    let toc = layout.load_toc()?;
    let metadata = layout.load_metadata()?;

    let listings = toc
        .chapters
        .into_iter()
        .map(|entry| {
            let has_audio = show_audio
                .then(|| layout.chapter_audio_path(engine, &entry.filename).exists());
            ChapterListing { entry, has_audio }
        })
        .collect();

    Ok((metadata, listings))
}

/// Fail with every requested chapter number that is not in `toc`.
pub fn validate_chapters(toc: &TableOfContents, chapters: &[usize]) -> Result<()> {
    let invalid: Vec<String> = chapters
        .iter()
        .filter(|number| toc.get(**number).is_none())
        .map(|number| number.to_string())
        .collect();

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(NarratorError::Validation {
            what: "chapters",
            invalid,
        })
    }
}

/// Open the book and check the requested chapters and voice against it and
/// `known_voices`. Needs no engine, so a bad request fails before one is
/// started.
pub fn check_audio_request(
    book_path: &Path,
    request: &AudioRequest<'_>,
    known_voices: &[&str],
) -> Result<(BookLayout, TableOfContents)> {
    let layout = open_book(book_path)?;
    let toc = layout.load_toc()?;
    validate_chapters(&toc, request.chapters)?;
    validate_voices(known_voices, &[request.voice])?;
    Ok((layout, toc))
}

/// Narrate the requested chapters of the book at `book_path` into
/// `audio/{engine}/chapters/`.
///
/// Chapter numbers and the voice are checked before any audio is generated.
/// After that, a chapter that fails or yields no audio is recorded in its
/// [`ChapterAudio`] and the remaining chapters still run.
pub fn generate_audio(
    book_path: &Path,
    request: &AudioRequest<'_>,
    engine: &mut dyn SynthesisEngine,
    reporter: &dyn Reporter,
) -> Result<Vec<ChapterAudio>> {
    let (layout, toc) = check_audio_request(book_path, request, engine.voices())?;

    let output_dir = layout.ensure_engine_dir(engine.name())?;
    let mut generator = SpeechGenerator::new(engine, reporter, output_dir)?;

    reporter.message(&format!(
        "🎙️ Generating audio for {} chapters with voice: {}",
        request.chapters.len(),
        request.voice
    ));

    let mut outcomes = Vec::with_capacity(request.chapters.len());
    for &number in request.chapters {
        let Some(entry) = toc.get(number) else {
            continue;
        };
        reporter.message(&format!("🎵 Processing Chapter {}: {}", number, entry.title));

        let result = layout.read_chapter(entry).and_then(|content| {
            generator.generate(
                &content,
                request.voice,
                &entry.filename,
                request.combine_segments,
            )
        });

        let outcome = match result {
            Ok(files) => ChapterAudio {
                number,
                title: entry.title.clone(),
                files,
                error: None,
            },
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                log::warn!("Chapter {} failed: {}", number, e);
                ChapterAudio {
                    number,
                    title: entry.title.clone(),
                    files: Vec::new(),
                    error: Some(e),
                }
            }
        };
        outcomes.push(outcome);
    }

    Ok(outcomes)
}
