use std::fmt;

use thiserror::Error;

/// SQLSTATE codes raised when the object a statement creates is already present.
const DUPLICATE_OBJECT_CODES: [&str; 6] = [
    "42P07", // duplicate_table
    "42710", // duplicate_object
    "42P06", // duplicate_schema
    "42723", // duplicate_function
    "42P04", // duplicate_database
    "42701", // duplicate_column
];

const ALREADY_EXISTS_TEXT: &str = "already exists";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementFailure {
    pub code: Option<String>,
    pub message: String,
}

impl StatementFailure {
    pub fn new(code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn is_already_exists(&self) -> bool {
        let duplicate_code = self
            .code
            .as_deref()
            .is_some_and(|code| DUPLICATE_OBJECT_CODES.contains(&code));

        duplicate_code || self.message.to_lowercase().contains(ALREADY_EXISTS_TEXT)
    }
}

impl fmt::Display for StatementFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} (SQLSTATE {code})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum TargetError {
    #[error("{0}")]
    Statement(StatementFailure),
    #[error("connection to the database was lost: {0}")]
    ConnectionLost(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementOutcome {
    Executed,
    AlreadyExists,
    Failed(StatementFailure),
}

impl StatementOutcome {
    pub fn from_failure(failure: StatementFailure) -> Self {
        if failure.is_already_exists() {
            StatementOutcome::AlreadyExists
        } else {
            StatementOutcome::Failed(failure)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionTally {
    pub successes: usize,
    pub errors: usize,
    /// Subset of `successes` that hit an existing object.
    pub already_existing: usize,
}

impl ExecutionTally {
    pub fn record(&mut self, outcome: &StatementOutcome) {
        match outcome {
            StatementOutcome::Executed => self.successes += 1,
            StatementOutcome::AlreadyExists => {
                self.successes += 1;
                self.already_existing += 1;
            }
            StatementOutcome::Failed(_) => self.errors += 1,
        }
    }

    pub fn attempted(&self) -> usize {
        self.successes + self.errors
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
}
