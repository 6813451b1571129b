use std::path::Path;

use anyhow::{Context, Result};
use lopdf::Document;
use tracing::debug;

use crate::domain::page_partition::PageRange;

pub struct PdfSource {
    document: Document,
    page_count: usize,
}

impl PdfSource {
    pub fn open(path: &Path) -> Result<Self> {
        let document = Document::load(path)
            .with_context(|| format!("Unable to read PDF: {}", path.display()))?;
        let page_count = document.get_pages().len();
        debug!(path = %path.display(), page_count, "loaded pdf");

        Ok(Self {
            document,
            page_count,
        })
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Writes the pages of `range`, in source order, as a new document at `output`.
    pub fn write_pages(&self, range: PageRange, output: &Path) -> Result<()> {
        let mut part = self.document.clone();

        // lopdf page numbers are one-based
        let pages_outside_range = (1..=self.page_count as u32)
            .filter(|&page_number| {
                let index = page_number as usize - 1;
                index < range.start || index >= range.end
            })
            .collect::<Vec<_>>();

        part.delete_pages(&pages_outside_range);
        part.prune_objects();
        part.save(output)
            .with_context(|| format!("Unable to write PDF: {}", output.display()))?;

        debug!(
            output = %output.display(),
            pages = range.len(),
            "wrote pdf part"
        );
        Ok(())
    }
}
