//! Engine backed by the `espeak-ng` command line synthesizer.
//!
//! Each sentence chunk is rendered to a temporary WAV file, decoded with
//! `hound`, mixed to mono and resampled to [`SAMPLE_RATE`]. The phoneme
//! string comes from a second `espeak-ng --ipa` pass over the same chunk.

use regex::Regex;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use super::{Segment, SegmentStream, SynthesisEngine, SAMPLE_RATE};
use crate::audio::resample;
use crate::error::{NarratorError, Result};

pub const ENGINE_NAME: &str = "espeak";

const ESPEAK_BIN: &str = "espeak-ng";

/// `espeak-ng` language for an engine language code.
fn espeak_language(lang_code: &str) -> Option<&'static str> {
    match lang_code {
        "a" => Some("en-us"),
        "b" => Some("en-gb"),
        _ => None,
    }
}

/// `espeak-ng` voice variant standing in for a narrator voice.
fn voice_variant(voice: &str) -> &'static str {
    match voice {
        "af_sarah" => "f2",
        "af_bella" => "f4",
        _ => "f3",
    }
}

pub struct EspeakEngine {
    language: &'static str,
    chunk_chars: usize,
    sentence_end: Regex,
}

impl EspeakEngine {
    /// Initialize the engine for `lang_code` (`a` = American English,
    /// `b` = British English). Fails if the code is unsupported or
    /// `espeak-ng` is not installed.
    pub fn new(lang_code: &str, chunk_chars: usize) -> Result<Self> {
        let language = espeak_language(lang_code).ok_or_else(|| {
            NarratorError::EngineInit(format!("unsupported language code '{}'", lang_code))
        })?;

        let available = Command::new(ESPEAK_BIN)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false);
        if !available {
            return Err(NarratorError::EngineInit(
                "espeak-ng not found. Please install espeak-ng".to_string(),
            ));
        }

        log::info!("Initialized espeak-ng TTS (lang: {} -> {})", lang_code, language);
        Ok(Self {
            language,
            chunk_chars: chunk_chars.max(1),
            sentence_end: Regex::new(r"[.!?]+\s+").unwrap(),
        })
    }

    /// Pack sentences into chunks of at most `chunk_chars` characters.
    /// A sentence longer than the limit becomes a chunk of its own.
    fn split_into_chunks(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current_chunk = String::new();

        for sentence in split_sentences(&self.sentence_end, text) {
            let sentence = sentence.trim();
            if sentence.is_empty() {
                continue;
            }

            if !current_chunk.is_empty()
                && current_chunk.len() + sentence.len() + 1 > self.chunk_chars
            {
                chunks.push(std::mem::take(&mut current_chunk));
            }

            if !current_chunk.is_empty() {
                current_chunk.push(' ');
            }
            current_chunk.push_str(sentence);
        }

        if !current_chunk.is_empty() {
            chunks.push(current_chunk);
        }

        chunks
    }

    fn command(&self, voice: &str) -> Command {
        let mut cmd = Command::new(ESPEAK_BIN);
        cmd.arg("-v")
            .arg(format!("{}+{}", self.language, voice_variant(voice)))
            .arg("--stdin");
        cmd
    }

    fn render(&self, chunk: &str, voice: &str) -> Result<Segment> {
        let wav = tempfile::Builder::new().suffix(".wav").tempfile()?;

        let mut cmd = self.command(voice);
        cmd.arg("-w").arg(wav.path());
        let output = run_with_input(cmd, chunk)?;
        if !output.status.success() {
            return Err(NarratorError::Generation(format!(
                "espeak-ng failed ({}): {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let samples = read_mono(wav.path())?;

        let mut cmd = self.command(voice);
        cmd.arg("-q").arg("--ipa");
        let phonemes = run_with_input(cmd, chunk)
            .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
            .unwrap_or_default();

        Ok(Segment {
            graphemes: chunk.to_string(),
            phonemes,
            samples,
        })
    }
}

impl SynthesisEngine for EspeakEngine {
    fn name(&self) -> &str {
        ENGINE_NAME
    }

    fn synthesize(&mut self, text: &str, voice: &str) -> Result<SegmentStream<'_>> {
        let chunks = self.split_into_chunks(text);
        let voice = voice.to_string();
        let engine: &Self = self;

        log::debug!("Synthesizing {} chunks with voice {}", chunks.len(), voice);
        Ok(Box::new(
            chunks
                .into_iter()
                .map(move |chunk| engine.render(&chunk, &voice)),
        ))
    }
}

/// Split after each run of sentence-ending punctuation, keeping the punctuation.
fn split_sentences<'t>(sentence_end: &Regex, text: &'t str) -> Vec<&'t str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in sentence_end.find_iter(text) {
        sentences.push(&text[start..m.end()]);
        start = m.end();
    }
    if start < text.len() {
        sentences.push(&text[start..]);
    }

    sentences
}

fn run_with_input(mut cmd: Command, input: &str) -> Result<Output> {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(stdin) = child.stdin.as_mut() {
        stdin.write_all(input.as_bytes())?;
    }

    Ok(child.wait_with_output()?)
}

/// Decode a WAV file to mono `f32` samples at [`SAMPLE_RATE`].
fn read_mono(path: &Path) -> Result<Vec<f32>> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<std::result::Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|s| s as f32 / scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    let mono = to_mono(&interleaved, spec.channels as usize);
    resample(&mono, spec.sample_rate, SAMPLE_RATE)
}

fn to_mono(data: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        data.to_vec()
    } else {
        data.chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(chunk_chars: usize) -> EspeakEngine {
        EspeakEngine {
            language: "en-us",
            chunk_chars,
            sentence_end: Regex::new(r"[.!?]+\s+").unwrap(),
        }
    }

    #[test]
    fn sentences_keep_their_punctuation() {
        let re = Regex::new(r"[.!?]+\s+").unwrap();
        assert_eq!(
            split_sentences(&re, "One. Two?! Three"),
            vec!["One. ", "Two?! ", "Three"]
        );
    }

    #[test]
    fn chunks_pack_sentences_up_to_limit() {
        let chunks = engine(20).split_into_chunks("Short one. Another one. Third!\n\nFourth.");
        assert_eq!(chunks, vec!["Short one.", "Another one. Third!", "Fourth."]);
    }

    #[test]
    fn oversized_sentence_is_its_own_chunk() {
        let chunks = engine(5).split_into_chunks("A very long sentence here. Hi.");
        assert_eq!(chunks, vec!["A very long sentence here.", "Hi."]);
    }

    #[test]
    fn blank_text_has_no_chunks() {
        assert!(engine(100).split_into_chunks("  \n ").is_empty());
    }

    #[test]
    fn unsupported_language_fails_init() {
        let err = EspeakEngine::new("x", 400).err().unwrap();
        assert!(err.is_fatal());
    }

    #[test]
    fn stereo_frames_are_averaged() {
        assert_eq!(to_mono(&[0.5, 1.0, -0.5, -1.0], 2), vec![0.75, -0.75]);
    }
}
