pub mod provision_table;
pub mod split_pdf;
