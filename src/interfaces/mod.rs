pub mod cli;
pub mod console;
