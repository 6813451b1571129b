use std::path::PathBuf;

use crate::domain::{
    execution::{ColumnInfo, ExecutionTally},
    page_partition::PageRange,
    statement_batch::StatementBatch,
};

#[derive(Debug)]
pub struct ProvisionTableCommand {
    pub batch: StatementBatch,
    pub schema: String,
    pub table: String,
}

#[derive(Debug)]
pub enum TableVerification {
    Verified {
        columns: Vec<ColumnInfo>,
        /// `None` when the count query is refused, e.g. without SELECT on the table.
        row_count: Option<i64>,
    },
    Missing,
}

#[derive(Debug)]
pub struct ProvisionTableResult {
    pub tally: ExecutionTally,
    pub verification: TableVerification,
}

#[derive(Debug)]
pub struct SplitPdfCommand {
    pub input_path: PathBuf,
    pub parts: usize,
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug)]
pub struct WrittenPart {
    pub output_path: PathBuf,
    pub range: PageRange,
}

#[derive(Debug)]
pub struct SplitPdfResult {
    pub total_pages: usize,
    pub parts: Vec<WrittenPart>,
}
