//! Speech generation: drives an engine and writes its segments as WAV files.

use audioadapter_buffers::direct::InterleavedSlice;
use rubato::{Fft, FixedSync, Resampler};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::{Segment, SynthesisEngine, SAMPLE_RATE};
use crate::error::{NarratorError, Result};

/// Input chunk requested from the FFT resampler; rubato may round it up.
const RESAMPLE_CHUNK: usize = 1024;
const RESAMPLE_SUB_CHUNKS: usize = 2;
use crate::report::Reporter;

/// Seconds of audio in `sample_count` mono samples at [`SAMPLE_RATE`].
pub fn duration_secs(sample_count: usize) -> f64 {
    sample_count as f64 / SAMPLE_RATE as f64
}

/// Write mono samples as a 32-bit float WAV file at [`SAMPLE_RATE`].
pub fn write_wav(path: &Path, samples: &[f32]) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Sample-accurate duration of a WAV file, read from its header.
pub fn wav_duration_secs(path: &Path) -> Result<f64> {
    let reader = hound::WavReader::open(path)?;
    let rate = reader.spec().sample_rate;
    Ok(reader.duration() as f64 / rate as f64)
}

/// Resample mono audio from `from_rate` to `to_rate` with rubato's FFT
/// resampler. The output holds exactly `len * to_rate / from_rate` samples.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let mut resampler = Fft::<f32>::new(
        from_rate as usize,
        to_rate as usize,
        RESAMPLE_CHUNK,
        RESAMPLE_SUB_CHUNKS,
        1,
        FixedSync::Input,
    )
    .map_err(|e| NarratorError::Generation(format!("failed to create resampler: {}", e)))?;

    let chunk_frames = resampler.input_frames_next();
    let output_frames_max = resampler.output_frames_max();
    let mut output_buffer = vec![0.0f32; output_frames_max];

    let expected_len = (samples.len() as u64 * to_rate as u64 / from_rate as u64) as usize;
    let mut output = Vec::with_capacity(expected_len + output_frames_max);

    for chunk in samples.chunks(chunk_frames) {
        let mut input_chunk = chunk.to_vec();
        input_chunk.resize(chunk_frames, 0.0);

        let input_adapter = InterleavedSlice::new(&input_chunk, 1, chunk_frames)
            .map_err(|e| NarratorError::Generation(format!("resampler input: {}", e)))?;
        let mut output_adapter = InterleavedSlice::new_mut(&mut output_buffer, 1, output_frames_max)
            .map_err(|e| NarratorError::Generation(format!("resampler output: {}", e)))?;

        let (_, frames_written) = resampler
            .process_into_buffer(&input_adapter, &mut output_adapter, None)
            .map_err(|e| NarratorError::Generation(format!("resampling error: {}", e)))?;
        output.extend_from_slice(&output_buffer[..frames_written]);
    }

    // Drop the padding of the last chunk.
    output.resize(expected_len, 0.0);
    Ok(output)
}

/// Runs one engine request per call and persists the resulting audio into
/// `output_dir`.
pub struct SpeechGenerator<'a> {
    engine: &'a mut dyn SynthesisEngine,
    reporter: &'a dyn Reporter,
    output_dir: PathBuf,
}

impl<'a> SpeechGenerator<'a> {
    /// Create the generator, creating `output_dir` if needed.
    pub fn new(
        engine: &'a mut dyn SynthesisEngine,
        reporter: &'a dyn Reporter,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(Self {
            engine,
            reporter,
            output_dir,
        })
    }

    /// Voices the underlying engine accepts.
    pub fn voices(&self) -> &[&str] {
        self.engine.voices()
    }

    /// Synthesize `text` and write the audio.
    ///
    /// With `combine_segments` the segments are concatenated in emission
    /// order into `{prefix}.wav`; otherwise each one is written as
    /// `{prefix}_{index:03}.wav`. Returns the written paths in order, which
    /// is empty when the engine emits no segments.
    ///
    /// The whole segment stream is collected before anything is written, so
    /// the segment count is known up front. This holds every segment in
    /// memory at once.
    pub fn generate(
        &mut self,
        text: &str,
        voice: &str,
        filename_prefix: &str,
        combine_segments: bool,
    ) -> Result<Vec<PathBuf>> {
        log::info!("🎙️ Generating speech with voice: {}", voice);

        let segments = self
            .engine
            .synthesize(text, voice)?
            .collect::<Result<Vec<Segment>>>()?;

        if segments.is_empty() {
            log::warn!("No audio segments produced for {}", filename_prefix);
            return Ok(Vec::new());
        }

        self.reporter.start("Generating...", segments.len());
        let result = self.write_segments(&segments, filename_prefix, combine_segments);
        self.reporter.finish();
        result
    }

    fn write_segments(
        &self,
        segments: &[Segment],
        filename_prefix: &str,
        combine_segments: bool,
    ) -> Result<Vec<PathBuf>> {
        let mut audio_files = Vec::new();

        for (i, segment) in segments.iter().enumerate() {
            self.reporter.step(&format!(
                "Segment {}/{}: gs={}, ps={}",
                i + 1,
                segments.len(),
                segment.graphemes,
                segment.phonemes
            ));

            if !combine_segments {
                let path = self
                    .output_dir
                    .join(format!("{}_{:03}.wav", filename_prefix, i));
                write_wav(&path, &segment.samples)?;
                log::debug!("💾 Saved segment: {}", path.display());
                audio_files.push(path);
            }
        }

        if combine_segments {
            let combined: Vec<f32> = segments
                .iter()
                .flat_map(|segment| segment.samples.iter().copied())
                .collect();
            let path = self.output_dir.join(format!("{}.wav", filename_prefix));
            write_wav(&path, &combined)?;

            let duration_mins = duration_secs(combined.len()) / 60.0;
            self.reporter.message(&format!(
                "🎵 Combined audio saved: {} ({:.1} minutes, {} segments combined)",
                path.display(),
                duration_mins,
                segments.len()
            ));
            audio_files.push(path);
        }

        Ok(audio_files)
    }
}
