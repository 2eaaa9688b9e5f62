//! Side-by-side voice comparison over one text.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::audio::{wav_duration_secs, SpeechGenerator};
use crate::engine::{validate_voices, SynthesisEngine};
use crate::error::{NarratorError, Result};
use crate::report::Reporter;

/// Outcome of generating the comparison text with one voice.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceComparisonResult {
    pub voice: String,
    /// Name of the audio file, or `"Failed"`/`"Error"` when nothing was produced.
    pub file: String,
    pub size_bytes: u64,
    pub duration_secs: f64,
    pub generation_secs: f64,
    pub success: bool,
    pub error: Option<String>,
}

impl VoiceComparisonResult {
    fn failed(voice: &str, marker: &str, generation_secs: f64, error: Option<String>) -> Self {
        Self {
            voice: voice.to_string(),
            file: marker.to_string(),
            size_bytes: 0,
            duration_secs: 0.0,
            generation_secs,
            success: false,
            error,
        }
    }

    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }

    pub fn duration_mins(&self) -> f64 {
        self.duration_secs / 60.0
    }
}

/// Generates the same text once per voice and collects the results.
pub struct VoiceComparison<'g, 'a> {
    generator: &'g mut SpeechGenerator<'a>,
    prefix: String,
}

impl<'g, 'a> VoiceComparison<'g, 'a> {
    /// Output files are named `{prefix}_{voice}.wav` in the generator's directory.
    pub fn new(generator: &'g mut SpeechGenerator<'a>, prefix: impl Into<String>) -> Self {
        Self {
            generator,
            prefix: prefix.into(),
        }
    }

    /// Run every voice in request order. Unknown voices reject the whole
    /// request before any audio is generated; a failure of one voice is
    /// recorded and the remaining voices still run.
    pub fn compare<S: AsRef<str>>(
        &mut self,
        text: &str,
        voices: &[S],
    ) -> Result<Vec<VoiceComparisonResult>> {
        validate_voices(self.generator.voices(), voices)?;

        let mut results = Vec::with_capacity(voices.len());
        for voice in voices {
            results.push(self.run_voice(text, voice.as_ref()));
        }
        Ok(results)
    }

    fn run_voice(&mut self, text: &str, voice: &str) -> VoiceComparisonResult {
        log::info!("🎵 Processing with voice: {}", voice);
        let prefix = format!("{}_{}", self.prefix, voice);
        let start_time = Instant::now();

        let generated = self.generator.generate(text, voice, &prefix, true);
        let generation_secs = start_time.elapsed().as_secs_f64();

        match generated {
            Ok(files) => match files.first() {
                Some(path) => measure(voice, path, generation_secs),
                None => {
                    log::warn!("Voice {} produced no audio", voice);
                    VoiceComparisonResult::failed(voice, "Failed", generation_secs, None)
                }
            },
            Err(e) => {
                log::warn!("Voice {} failed: {}", voice, e);
                VoiceComparisonResult::failed(voice, "Error", generation_secs, Some(e.to_string()))
            }
        }
    }
}

/// A finished comparison run over a text file.
#[derive(Debug, Clone)]
pub struct ComparisonRun {
    pub session_dir: PathBuf,
    pub text_chars: usize,
    pub results: Vec<VoiceComparisonResult>,
}

/// Session name for a text file: its stem, lower-cased, spaces as hyphens.
pub fn session_slug(text_file: &Path) -> String {
    text_file
        .file_stem()
        .map(|stem| stem.to_string_lossy().replace(' ', "-").to_lowercase())
        .unwrap_or_else(|| "sample".to_string())
}

/// Read the comparison text, rejecting missing or blank files.
pub fn load_text(text_file: &Path) -> Result<String> {
    if !text_file.exists() {
        return Err(NarratorError::not_found("Text file", text_file));
    }

    let text = fs::read_to_string(text_file)?.trim().to_string();
    if text.is_empty() {
        return Err(NarratorError::EmptyInput(format!(
            "Text file is empty: {}",
            text_file.display()
        )));
    }
    Ok(text)
}

/// Load the comparison text and check `voices` against `known_voices`.
/// Needs no engine, so a bad request fails before one is started.
pub fn prepare_comparison<S: AsRef<str>>(
    text_file: &Path,
    voices: &[S],
    known_voices: &[&str],
) -> Result<String> {
    let text = load_text(text_file)?;
    validate_voices(known_voices, voices)?;
    Ok(text)
}

/// Compare `voices` on the contents of `text_file`, writing audio into
/// `{output_dir}/{session_slug}/`.
pub fn compare_file<S: AsRef<str>>(
    text_file: &Path,
    voices: &[S],
    output_dir: &Path,
    engine: &mut dyn SynthesisEngine,
    reporter: &dyn Reporter,
) -> Result<ComparisonRun> {
    let text = prepare_comparison(text_file, voices, engine.voices())?;

    let slug = session_slug(text_file);
    let session_dir = output_dir.join(&slug);
    let mut generator = SpeechGenerator::new(engine, reporter, &session_dir)?;

    let results = VoiceComparison::new(&mut generator, slug).compare(&text, voices)?;

    Ok(ComparisonRun {
        session_dir,
        text_chars: text.chars().count(),
        results,
    })
}

fn measure(voice: &str, path: &Path, generation_secs: f64) -> VoiceComparisonResult {
    let size_bytes = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    let duration_secs = wav_duration_secs(path).unwrap_or_else(|e| {
        log::warn!("Could not read duration of {}: {}", path.display(), e);
        0.0
    });

    VoiceComparisonResult {
        voice: voice.to_string(),
        file: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        size_bytes,
        duration_secs,
        generation_secs,
        success: true,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Segment, SegmentStream, SynthesisEngine};
    use crate::error::NarratorError;
    use crate::report::LogReporter;
    use tempfile::TempDir;

    /// One second of audio per call; `af_sarah` breaks after its first segment.
    struct FlakyEngine {
        calls: Vec<String>,
    }

    impl SynthesisEngine for FlakyEngine {
        fn name(&self) -> &str {
            "flaky"
        }

        fn synthesize(&mut self, text: &str, voice: &str) -> Result<SegmentStream<'_>> {
            self.calls.push(voice.to_string());
            let segment = Segment {
                graphemes: text.to_string(),
                phonemes: String::new(),
                samples: vec![0.25; 24_000],
            };
            let mut items = vec![Ok(segment)];
            if voice == "af_sarah" {
                items.push(Err(NarratorError::Generation("synthesis crashed".into())));
            }
            Ok(Box::new(items.into_iter()))
        }
    }

    #[test]
    fn failing_voice_does_not_stop_the_batch() {
        let dir = TempDir::new().unwrap();
        let mut engine = FlakyEngine { calls: Vec::new() };
        let mut generator = SpeechGenerator::new(&mut engine, &LogReporter, dir.path()).unwrap();

        let results = VoiceComparison::new(&mut generator, "sample")
            .compare("Hello there.", &["af_sarah", "af_heart"])
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].voice, "af_sarah");
        assert!(!results[0].success);
        assert_eq!(results[0].file, "Error");
        assert_eq!(results[0].size_bytes, 0);
        assert_eq!(results[0].duration_secs, 0.0);
        assert!(results[0].error.as_deref().unwrap().contains("synthesis crashed"));

        assert_eq!(results[1].voice, "af_heart");
        assert!(results[1].success);
        assert_eq!(results[1].file, "sample_af_heart.wav");
        assert_eq!(results[1].duration_secs, 1.0);
        assert!(results[1].size_bytes > 24_000 * 4);
        assert!(dir.path().join("sample_af_heart.wav").exists());
        assert!(!dir.path().join("sample_af_sarah.wav").exists());
    }

    #[test]
    fn empty_text_is_recorded_as_failure() {
        struct SilentEngine;
        impl SynthesisEngine for SilentEngine {
            fn name(&self) -> &str {
                "silent"
            }
            fn synthesize(&mut self, _text: &str, _voice: &str) -> Result<SegmentStream<'_>> {
                Ok(Box::new(std::iter::empty()))
            }
        }

        let dir = TempDir::new().unwrap();
        let mut engine = SilentEngine;
        let mut generator = SpeechGenerator::new(&mut engine, &LogReporter, dir.path()).unwrap();

        let results = VoiceComparison::new(&mut generator, "empty")
            .compare("", &["af_bella"])
            .unwrap();

        assert_eq!(results.len(), 1);
        assert!(!results[0].success);
        assert_eq!(results[0].file, "Failed");
        assert!(results[0].error.is_none());
    }

    #[test]
    fn unknown_voice_fails_before_any_generation() {
        let dir = TempDir::new().unwrap();
        let mut engine = FlakyEngine { calls: Vec::new() };
        {
            let mut generator =
                SpeechGenerator::new(&mut engine, &LogReporter, dir.path()).unwrap();
            let err = VoiceComparison::new(&mut generator, "sample")
                .compare("Hello.", &["af_heart", "xx_unknown"])
                .unwrap_err();
            assert!(matches!(err, NarratorError::Validation { .. }));
        }
        assert!(engine.calls.is_empty());
    }

    #[test]
    fn session_slug_uses_lowercased_stem() {
        assert_eq!(session_slug(Path::new("texts/My Sample Text.txt")), "my-sample-text");
        assert_eq!(session_slug(Path::new("short_sample.txt")), "short_sample");
    }

    #[test]
    fn blank_text_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blank.txt");
        fs::write(&path, "  \n\n ").unwrap();

        assert!(matches!(load_text(&path), Err(NarratorError::EmptyInput(_))));
        assert!(matches!(
            load_text(&dir.path().join("missing.txt")),
            Err(NarratorError::NotFound { .. })
        ));
    }

    #[test]
    fn bad_requests_fail_without_an_engine() {
        let dir = TempDir::new().unwrap();
        let text_file = dir.path().join("sample.txt");
        fs::write(&text_file, "Some text.").unwrap();

        let known = crate::engine::VOICE_NAMES;
        assert_eq!(prepare_comparison(&text_file, &["af_bella"], known).unwrap(), "Some text.");
        assert!(matches!(
            prepare_comparison(&text_file, &["zz_nope"], known),
            Err(NarratorError::Validation { what: "voices", .. })
        ));
        assert!(matches!(
            prepare_comparison(&dir.path().join("missing.txt"), &["zz_nope"], known),
            Err(NarratorError::NotFound { .. })
        ));
    }

    #[test]
    fn compare_file_writes_into_session_dir() {
        let dir = TempDir::new().unwrap();
        let text_file = dir.path().join("Short Sample.txt");
        fs::write(&text_file, "  A quick test.  ").unwrap();
        let mut engine = FlakyEngine { calls: Vec::new() };

        let run = compare_file(
            &text_file,
            &["af_heart", "af_bella"],
            &dir.path().join("voice_comparisons"),
            &mut engine,
            &LogReporter,
        )
        .unwrap();

        assert_eq!(run.session_dir, dir.path().join("voice_comparisons/short-sample"));
        assert_eq!(run.text_chars, "A quick test.".len());
        assert!(run.results.iter().all(|r| r.success));
        assert!(run.session_dir.join("short-sample_af_bella.wav").exists());
        assert_eq!(engine.calls, ["af_heart", "af_bella"]);
    }
}
