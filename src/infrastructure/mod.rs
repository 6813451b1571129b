pub mod pdf_document;
pub mod postgres_target;
pub mod sql_table_inspector;
