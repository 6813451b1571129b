use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    application::commands::{ProvisionTableCommand, ProvisionTableResult, TableVerification},
    domain::{
        execution::{ColumnInfo, ExecutionTally, StatementOutcome, TargetError},
        statement_batch::statement_preview,
    },
};

/// Database the provisioner runs statements and catalog lookups against.
pub trait SchemaTarget {
    fn execute(&mut self, statement: &str) -> Result<(), TargetError>;
    fn table_exists(&mut self, schema: &str, table: &str) -> Result<bool, TargetError>;
    fn table_columns(&mut self, schema: &str, table: &str) -> Result<Vec<ColumnInfo>, TargetError>;
    fn row_count(&mut self, schema: &str, table: &str) -> Result<i64, TargetError>;
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("connection lost while executing statement {index}/{total}: {reason}")]
    ConnectionLost {
        index: usize,
        total: usize,
        reason: String,
    },
    #[error("schema verification failed: {0}")]
    Verification(TargetError),
}

#[derive(Debug)]
pub struct StatementProgress<'a> {
    pub index: usize,
    pub total: usize,
    pub preview: String,
    pub outcome: &'a StatementOutcome,
}

#[derive(Debug, Default)]
pub struct ProvisionTableUseCase;

impl ProvisionTableUseCase {
    pub fn execute<T: SchemaTarget>(
        &self,
        command: ProvisionTableCommand,
        target: &mut T,
        mut on_statement: impl FnMut(StatementProgress<'_>),
    ) -> Result<ProvisionTableResult, ProvisionError> {
        let total = command.batch.len();
        let mut tally = ExecutionTally::default();

        for (offset, statement) in command.batch.iter().enumerate() {
            let index = offset + 1;
            let preview = statement_preview(statement);
            debug!(index, total, statement = %preview, "executing statement");

            let outcome = match target.execute(statement) {
                Ok(()) => StatementOutcome::Executed,
                Err(TargetError::Statement(failure)) => StatementOutcome::from_failure(failure),
                Err(TargetError::ConnectionLost(reason)) => {
                    return Err(ProvisionError::ConnectionLost {
                        index,
                        total,
                        reason,
                    });
                }
            };
            if let StatementOutcome::Failed(failure) = &outcome {
                warn!(index, statement = %preview, %failure, "statement failed");
            }

            tally.record(&outcome);
            on_statement(StatementProgress {
                index,
                total,
                preview,
                outcome: &outcome,
            });
        }
        info!(
            attempted = tally.attempted(),
            successes = tally.successes,
            errors = tally.errors,
            already_existing = tally.already_existing,
            "statement batch finished"
        );

        let verification = verify_table(target, &command.schema, &command.table)
            .map_err(ProvisionError::Verification)?;

        Ok(ProvisionTableResult {
            tally,
            verification,
        })
    }
}

fn verify_table<T: SchemaTarget>(
    target: &mut T,
    schema: &str,
    table: &str,
) -> Result<TableVerification, TargetError> {
    if !target.table_exists(schema, table)? {
        warn!(schema, table, "table not found after provisioning");
        return Ok(TableVerification::Missing);
    }

    let columns = target.table_columns(schema, table)?;
    let row_count = match target.row_count(schema, table) {
        Ok(count) => Some(count),
        Err(TargetError::Statement(failure)) => {
            warn!(schema, table, %failure, "unable to count rows");
            None
        }
        Err(lost @ TargetError::ConnectionLost(_)) => return Err(lost),
    };
    info!(schema, table, columns = columns.len(), ?row_count, "table verified");

    Ok(TableVerification::Verified { columns, row_count })
}
