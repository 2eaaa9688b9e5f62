//! Sample texts for trying out voices before narrating a whole book.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

const SHORT_SAMPLE: &str = "Hello, this is a short voice test. \
Listen for how natural each voice sounds before choosing one to narrate a whole book.";

const MEDIUM_SAMPLE: &str = r#"# Voice Test Sample

This medium-length sample mixes sentence shapes and punctuation so voices can be judged on more than a single line.

**Narration**: Rain drummed on the tin roof of the station while the last train pulled away, its lamps shrinking into the fog.

**Dialogue**: "Did you bring the tickets?" she asked, already knowing the answer.

"I thought you had them," he said, patting every pocket twice.

**Instructions**: First, open the valve. Second, wait for the pressure gauge to settle. Third, record the reading before closing it again.

**Numbers**: The journey covers 412 kilometres, takes 5.5 hours, and costs about 38 euros one way."#;

const LONG_SAMPLE: &str = r#"# Extended Voice Sample

## Story

The lighthouse keeper had not spoken to anyone in eleven days. Each evening he climbed the hundred and twelve steps, trimmed the wick, and watched the beam sweep across the black water. On the twelfth evening, a small boat appeared where no boat should have been.

He raised his lantern. The figure in the boat raised one back.

## Explanation

A lighthouse lens gathers light from a single flame and bends it into a narrow, powerful beam. The rings of glass, called prisms, each redirect a portion of the light, so that very little is wasted. The result can be seen from more than twenty nautical miles away on a clear night.

## Emotion

When the letter finally arrived, her hands shook so badly that she had to set it on the table to read it. Three words in, she laughed. Five words in, she was crying. By the end, she was doing both at once, and did not care who saw.

## Conversation

"You're late," said the captain, without looking up from the chart.

"The tide was against us," the mate replied.

"The tide is always against us. That is why we leave early."

"Then perhaps," the mate said, smiling, "tomorrow you could tell the tide."

## Closing

A good narrator disappears into the story. Listen for the voice that keeps your attention without ever asking for it."#;

/// A sample file written by [`create_samples`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleFile {
    pub path: PathBuf,
    pub chars: usize,
}

/// Write the short, medium and long sample texts into `dir`.
pub fn create_samples(dir: &Path) -> Result<Vec<SampleFile>> {
    fs::create_dir_all(dir)?;

    let samples = [
        ("short_sample.txt", SHORT_SAMPLE),
        ("medium_sample.txt", MEDIUM_SAMPLE),
        ("long_sample.txt", LONG_SAMPLE),
    ];

    let mut written = Vec::with_capacity(samples.len());
    for (filename, content) in samples {
        let path = dir.join(filename);
        fs::write(&path, content)?;
        written.push(SampleFile {
            path,
            chars: content.chars().count(),
        });
    }

    Ok(written)
}
