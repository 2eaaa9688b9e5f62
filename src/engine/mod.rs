//! Speech synthesis engines.
//!
//! An engine turns text and a voice into a lazy stream of [`Segment`]s.
//! Chunking of the input text happens inside the engine; callers only see
//! the segments in emission order.

pub mod espeak;

use crate::error::{NarratorError, Result};

/// Sample rate of every segment produced by an engine.
pub const SAMPLE_RATE: u32 = 24000;

pub const DEFAULT_VOICE: &str = "af_heart";

/// Voices every engine accepts unless it narrows the set.
pub const VOICE_NAMES: &[&str] = &["af_heart", "af_sarah", "af_bella"];

/// Known voices and a short description of each.
pub const VOICES: &[(&str, &str)] = &[
    ("af_heart", "Natural, clear narrator voice (default) - Great for general content"),
    ("af_sarah", "Expressive female voice - Good for dialogue and emotional content"),
    ("af_bella", "Warm storytelling voice - Perfect for narratives and fiction"),
];

/// One audio buffer emitted by an engine for a span of the input text.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// The text span this segment speaks.
    pub graphemes: String,
    /// Phoneme rendering of the span, for diagnostics.
    pub phonemes: String,
    /// Mono samples at [`SAMPLE_RATE`].
    pub samples: Vec<f32>,
}

/// Lazy, finite stream of segments. An `Err` item ends the request.
pub type SegmentStream<'a> = Box<dyn Iterator<Item = Result<Segment>> + 'a>;

/// Common interface for text-to-speech engines.
pub trait SynthesisEngine {
    /// Name used for the engine's audio directory (`audio/{name}/chapters`).
    fn name(&self) -> &str;

    /// Voices this engine can speak with.
    fn voices(&self) -> &[&str] {
        VOICE_NAMES
    }

    /// Start synthesizing `text` with `voice`.
    fn synthesize(&mut self, text: &str, voice: &str) -> Result<SegmentStream<'_>>;
}

/// Voices of the engine called `name`, known before it is started.
pub fn voices_for(name: &str) -> Result<&'static [&'static str]> {
    match name {
        espeak::ENGINE_NAME => Ok(VOICE_NAMES),
        other => Err(unknown_engine(other)),
    }
}

/// Start the engine called `name`.
pub fn open(name: &str, lang_code: &str, chunk_chars: usize) -> Result<Box<dyn SynthesisEngine>> {
    match name {
        espeak::ENGINE_NAME => Ok(Box::new(espeak::EspeakEngine::new(lang_code, chunk_chars)?)),
        other => Err(unknown_engine(other)),
    }
}

fn unknown_engine(name: &str) -> NarratorError {
    NarratorError::EngineInit(format!("unknown TTS engine '{}'", name))
}

pub fn voice_names() -> impl Iterator<Item = &'static str> {
    VOICE_NAMES.iter().copied()
}

pub fn voice_description(voice: &str) -> Option<&'static str> {
    VOICES
        .iter()
        .find(|(name, _)| *name == voice)
        .map(|(_, description)| *description)
}

pub fn is_known_voice(voice: &str) -> bool {
    VOICE_NAMES.contains(&voice)
}

/// Fail with every requested voice missing from `known` listed.
pub fn validate_voices<S: AsRef<str>>(known: &[&str], voices: &[S]) -> Result<()> {
    let invalid: Vec<String> = voices
        .iter()
        .map(AsRef::as_ref)
        .filter(|voice| !known.contains(voice))
        .map(str::to_string)
        .collect();

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(NarratorError::Validation {
            what: "voices",
            invalid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct HeartOnly;

    impl SynthesisEngine for HeartOnly {
        fn name(&self) -> &str {
            "heart-only"
        }

        fn voices(&self) -> &[&str] {
            &["af_heart"]
        }

        fn synthesize(&mut self, _text: &str, _voice: &str) -> Result<SegmentStream<'_>> {
            Ok(Box::new(std::iter::empty()))
        }
    }

    #[test]
    fn default_voice_is_known() {
        assert!(is_known_voice(DEFAULT_VOICE));
        assert_eq!(voice_names().count(), 3);
    }

    #[test]
    fn every_voice_has_a_description() {
        let described: Vec<_> = VOICES.iter().map(|(name, _)| *name).collect();
        assert_eq!(described, VOICE_NAMES);
        assert!(voice_description("af_sarah").is_some());
    }

    #[test]
    fn unknown_engine_cannot_be_started() {
        assert_eq!(voices_for(espeak::ENGINE_NAME).unwrap(), VOICE_NAMES);
        assert!(voices_for("kokoro").unwrap_err().is_fatal());
        assert!(open("kokoro", "a", 400).err().unwrap().is_fatal());
    }

    #[test]
    fn validation_uses_the_engine_voice_set() {
        let engine = HeartOnly;
        validate_voices(engine.voices(), &["af_heart"]).unwrap();
        assert!(validate_voices(engine.voices(), &["af_bella"]).is_err());
    }

    #[test]
    fn validation_lists_all_unknown_voices() {
        validate_voices(VOICE_NAMES, &["af_heart", "af_bella"]).unwrap();

        match validate_voices(VOICE_NAMES, &["af_heart", "zz_nope", "am_adam"]).unwrap_err() {
            NarratorError::Validation { what, invalid } => {
                assert_eq!(what, "voices");
                assert_eq!(invalid, vec!["zz_nope", "am_adam"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
