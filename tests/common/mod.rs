//! Shared fixtures: a minimal EPUB writer and a scripted synthesis engine.

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::Path;

use book_narrator::engine::{Segment, SegmentStream, SynthesisEngine, VOICE_NAMES};
use book_narrator::{NarratorError, Result};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

const TOC_NCX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head><meta name="dtb:uid" content="urn:uuid:0f6c2a0e-test"/></head>
  <docTitle><text>Test Voyage</text></docTitle>
  <navMap>
    <navPoint id="nav1" playOrder="1">
      <navLabel><text>The Beginning</text></navLabel>
      <content src="ch1.xhtml"/>
    </navPoint>
  </navMap>
</ncx>"#;

/// One spine document: manifest id and its body markup.
pub struct Doc<'a> {
    pub id: &'a str,
    pub body: &'a str,
}

/// Write an EPUB 2 file at `path` with the given spine documents in order.
pub fn write_epub(path: &Path, title: &str, author: &str, docs: &[Doc<'_>]) -> TestResult {
    let mut zip = ZipWriter::new(File::create(path)?);
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    zip.start_file("mimetype", stored)?;
    zip.write_all(b"application/epub+zip")?;

    zip.start_file("META-INF/container.xml", stored)?;
    zip.write_all(CONTAINER_XML.as_bytes())?;

    let manifest: String = docs
        .iter()
        .map(|doc| {
            format!(
                "    <item id=\"{0}\" href=\"{0}.xhtml\" media-type=\"application/xhtml+xml\"/>\n",
                doc.id
            )
        })
        .collect();
    let spine: String = docs
        .iter()
        .map(|doc| format!("    <itemref idref=\"{}\"/>\n", doc.id))
        .collect();
    let opf = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="bookid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>{title}</dc:title>
    <dc:creator>{author}</dc:creator>
    <dc:language>en</dc:language>
    <dc:identifier id="bookid">urn:uuid:0f6c2a0e-test</dc:identifier>
  </metadata>
  <manifest>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
{manifest}  </manifest>
  <spine toc="ncx">
{spine}  </spine>
</package>"#
    );
    zip.start_file("OEBPS/content.opf", stored)?;
    zip.write_all(opf.as_bytes())?;

    zip.start_file("OEBPS/toc.ncx", stored)?;
    zip.write_all(TOC_NCX.as_bytes())?;

    for doc in docs {
        let xhtml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <html xmlns=\"http://www.w3.org/1999/xhtml\"><body>{}</body></html>",
            doc.body
        );
        zip.start_file(format!("OEBPS/{}.xhtml", doc.id), stored)?;
        zip.write_all(xhtml.as_bytes())?;
    }

    zip.finish()?;
    Ok(())
}

/// Emits one segment per sentence with `samples_per_segment` samples each.
/// Text containing `fail_on` makes the stream error after its first segment.
pub struct ScriptedEngine {
    pub samples_per_segment: usize,
    pub fail_on: Option<&'static str>,
    pub voices: &'static [&'static str],
    pub requests: Vec<(String, String)>,
}

impl ScriptedEngine {
    pub fn new(samples_per_segment: usize) -> Self {
        Self {
            samples_per_segment,
            fail_on: None,
            voices: VOICE_NAMES,
            requests: Vec::new(),
        }
    }
}

impl SynthesisEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    fn voices(&self) -> &[&str] {
        self.voices
    }

    fn synthesize(&mut self, text: &str, voice: &str) -> Result<SegmentStream<'_>> {
        self.requests.push((text.to_string(), voice.to_string()));

        let len = self.samples_per_segment;
        let mut items: Vec<Result<Segment>> = text
            .split_terminator('.')
            .map(str::trim)
            .filter(|sentence| !sentence.is_empty())
            .map(|sentence| {
                Ok(Segment {
                    graphemes: sentence.to_string(),
                    phonemes: String::new(),
                    samples: vec![0.5; len],
                })
            })
            .collect();

        if let Some(marker) = self.fail_on {
            if text.contains(marker) {
                items.truncate(1);
                items.push(Err(NarratorError::Generation(format!("cannot say {}", marker))));
            }
        }
        Ok(Box::new(items.into_iter()))
    }
}
