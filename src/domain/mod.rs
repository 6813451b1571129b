pub mod execution;
pub mod page_partition;
pub mod project;
pub mod statement_batch;
