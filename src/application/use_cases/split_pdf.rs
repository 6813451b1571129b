use anyhow::Result;
use tracing::info;

use crate::{
    application::commands::{SplitPdfCommand, SplitPdfResult, WrittenPart},
    domain::page_partition::{PagePartition, part_output_path},
    infrastructure::pdf_document::PdfSource,
};

#[derive(Debug, Default)]
pub struct SplitPdfUseCase;

impl SplitPdfUseCase {
    pub fn execute(
        &self,
        command: SplitPdfCommand,
        mut on_part: impl FnMut(&WrittenPart),
    ) -> Result<SplitPdfResult> {
        let source = PdfSource::open(&command.input_path)?;
        let partition = PagePartition::compute(source.page_count(), command.parts)?;
        info!(
            total_pages = partition.total_pages(),
            pages_per_part = partition.pages_per_part(),
            parts = command.parts,
            "splitting pdf"
        );

        let mut written_parts = Vec::with_capacity(partition.ranges().len());
        for (offset, range) in partition.ranges().iter().enumerate() {
            let output_path =
                part_output_path(&command.input_path, offset + 1, command.output_dir.as_deref());
            source.write_pages(*range, &output_path)?;

            let written = WrittenPart {
                output_path,
                range: *range,
            };
            on_part(&written);
            written_parts.push(written);
        }

        Ok(SplitPdfResult {
            total_pages: partition.total_pages(),
            parts: written_parts,
        })
    }
}
