//! Access to EPUB containers.
//!
//! Extraction only needs the reading-order list of content documents and a
//! descriptive-metadata lookup, so the container is reached through the
//! small [`EpubSource`] trait.

use ::epub::doc::EpubDoc;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{NarratorError, Result};

/// Dublin Core namespace key used for descriptive metadata lookups.
pub const DC_NAMESPACE: &str = "DC";

/// Kind of a content unit inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Document,
    Other,
}

/// One unit of the container in reading order.
#[derive(Debug, Clone)]
pub struct DocumentUnit {
    pub id: String,
    pub kind: UnitKind,
    pub markup: String,
}

impl DocumentUnit {
    pub fn document(id: impl Into<String>, markup: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: UnitKind::Document,
            markup: markup.into(),
        }
    }
}

pub trait EpubSource {
    /// Content units in the container's reading order.
    fn units(&mut self) -> Result<Vec<DocumentUnit>>;

    /// First value recorded for `field` under `namespace`, if any.
    fn metadata(&self, namespace: &str, field: &str) -> Option<String>;
}

/// [`EpubSource`] backed by an EPUB file on disk.
pub struct EpubDocSource {
    doc: EpubDoc<BufReader<File>>,
}

impl EpubDocSource {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(NarratorError::not_found("EPUB file", path));
        }

        let doc = EpubDoc::new(path)
            .map_err(|e| NarratorError::Epub(format!("{}: {}", path.display(), e)))?;
        Ok(Self { doc })
    }
}

impl EpubSource for EpubDocSource {
    fn units(&mut self) -> Result<Vec<DocumentUnit>> {
        let spine = self.doc.spine.clone();
        let mut units = Vec::with_capacity(spine.len());

        for id in spine {
            let Some((markup, mime)) = self.doc.get_resource_str(&id) else {
                log::warn!("Spine item {} has no readable resource, skipping", id);
                continue;
            };

            let kind = if mime.contains("html") {
                UnitKind::Document
            } else {
                UnitKind::Other
            };
            units.push(DocumentUnit { id, kind, markup });
        }

        Ok(units)
    }

    fn metadata(&self, namespace: &str, field: &str) -> Option<String> {
        if !namespace.eq_ignore_ascii_case(DC_NAMESPACE) {
            return None;
        }
        self.doc.mdata(field)
    }
}
