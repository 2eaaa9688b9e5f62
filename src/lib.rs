//! # book-narrator
//!
//! Converts EPUB books into a structured project on disk (metadata, table of
//! contents and one markdown file per chapter) and narrates chapters with a
//! text-to-speech engine.
//!
//! ```no_run
//! use book_narrator::{book::BookProcessor, engine::espeak::EspeakEngine};
//! use book_narrator::book::{generate_audio, AudioRequest};
//! use book_narrator::report::LogReporter;
//! use std::path::Path;
//!
//! let processor = BookProcessor::new("books");
//! let conversion = processor.convert(Path::new("moby-dick.epub"), "Moby Dick", None, "espeak")?;
//!
//! let mut engine = EspeakEngine::new("a", 400)?;
//! let request = AudioRequest { chapters: &[1, 2], voice: "af_heart", combine_segments: true };
//! generate_audio(&conversion.layout.root, &request, &mut engine, &LogReporter)?;
//! # Ok::<(), book_narrator::NarratorError>(())
//! ```

pub mod audio;
pub mod book;
pub mod compare;
pub mod config;
pub mod container;
pub mod engine;
pub mod error;
pub mod extract;
pub mod layout;
pub mod report;
pub mod samples;
pub mod text;

pub use config::Config;
pub use engine::{Segment, SynthesisEngine, SAMPLE_RATE};
pub use error::{NarratorError, Result};
pub use extract::{BookMetadata, Chapter};
pub use layout::{BookLayout, TableOfContents, TocEntry};
