use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use thiserror::Error;

const DEFAULT_EXTENSION: &str = "pdf";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartitionError {
    #[error("Part count must be greater than 0")]
    ZeroParts,
    #[error("Document has no pages to split")]
    EmptyDocument,
    #[error(
        "Splitting {total_pages} pages into {parts} parts leaves part {part} empty (at most {max_parts} non-empty parts are possible)"
    )]
    EmptyPart {
        part: usize,
        total_pages: usize,
        parts: usize,
        max_parts: usize,
    },
}

/// Half-open range of zero-based page indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
}

impl PageRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One-based inclusive range, e.g. `1-4`.
    pub fn display_range(&self) -> String {
        format!("{}-{}", self.start + 1, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePartition {
    total_pages: usize,
    pages_per_part: usize,
    ranges: Vec<PageRange>,
}

impl PagePartition {
    pub fn compute(total_pages: usize, parts: usize) -> Result<Self, PartitionError> {
        if parts == 0 {
            return Err(PartitionError::ZeroParts);
        }
        if total_pages == 0 {
            return Err(PartitionError::EmptyDocument);
        }

        let pages_per_part = total_pages.div_ceil(parts);
        let ranges = (0..parts)
            .map(|index| {
                let start = (index * pages_per_part).min(total_pages);
                let end = ((index + 1) * pages_per_part).min(total_pages);
                PageRange { start, end }
            })
            .collect::<Vec<_>>();

        if let Some(empty_index) = ranges.iter().position(PageRange::is_empty) {
            return Err(PartitionError::EmptyPart {
                part: empty_index + 1,
                total_pages,
                parts,
                max_parts: max_non_empty_parts(total_pages, parts),
            });
        }

        Ok(Self {
            total_pages,
            pages_per_part,
            ranges,
        })
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn pages_per_part(&self) -> usize {
        self.pages_per_part
    }

    pub fn ranges(&self) -> &[PageRange] {
        &self.ranges
    }
}

fn max_non_empty_parts(total_pages: usize, requested: usize) -> usize {
    (1..requested)
        .rev()
        .find(|&parts| (parts - 1) * total_pages.div_ceil(parts) < total_pages)
        .unwrap_or(1)
}

/// Builds `<dir>/<stem>_part<N>.<ext>` for a one-based part number.
pub fn part_output_path(input: &Path, part_number: usize, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("document"));
    let extension = input
        .extension()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from(DEFAULT_EXTENSION));

    let mut file_name = stem;
    file_name.push(format!("_part{part_number}."));
    file_name.push(extension);

    let directory = output_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    directory.join(file_name)
}
