use postgres::{Client, NoTls};
use tracing::{debug, info};

use crate::{
    application::use_cases::provision_table::SchemaTarget,
    domain::{
        execution::{ColumnInfo, StatementFailure, TargetError},
        project::ConnectionConfig,
    },
};

const TABLE_EXISTS_QUERY: &str = "SELECT COUNT(*) FROM information_schema.tables \
     WHERE table_schema = $1 AND table_name = $2";

const TABLE_COLUMNS_QUERY: &str = "SELECT column_name::text, data_type::text \
     FROM information_schema.columns \
     WHERE table_schema = $1 AND table_name = $2 \
     ORDER BY ordinal_position";

/// Autocommit connection: every statement runs outside an explicit transaction.
pub struct PostgresTarget {
    client: Client,
}

impl PostgresTarget {
    pub fn connect(config: &ConnectionConfig) -> Result<Self, postgres::Error> {
        debug!(?config, "opening postgres connection");
        let client = postgres::Config::new()
            .host(&config.host)
            .port(config.port)
            .dbname(&config.database)
            .user(&config.user)
            .password(config.password())
            .application_name("leadkit")
            .connect(NoTls)?;
        info!(host = %config.host, database = %config.database, "connected");

        Ok(Self { client })
    }

    fn classify(&self, error: postgres::Error) -> TargetError {
        if self.client.is_closed() {
            return TargetError::ConnectionLost(error.to_string());
        }

        let failure = match error.as_db_error() {
            Some(db_error) => StatementFailure::new(
                Some(db_error.code().code().to_string()),
                db_error.message(),
            ),
            None => StatementFailure::new(
                error.code().map(|state| state.code().to_string()),
                error.to_string(),
            ),
        };
        TargetError::Statement(failure)
    }
}

impl SchemaTarget for PostgresTarget {
    fn execute(&mut self, statement: &str) -> Result<(), TargetError> {
        self.client
            .batch_execute(statement)
            .map_err(|error| self.classify(error))
    }

    fn table_exists(&mut self, schema: &str, table: &str) -> Result<bool, TargetError> {
        let row = self
            .client
            .query_one(TABLE_EXISTS_QUERY, &[&schema, &table])
            .map_err(|error| self.classify(error))?;
        let count: i64 = row.get(0);
        Ok(count > 0)
    }

    fn table_columns(&mut self, schema: &str, table: &str) -> Result<Vec<ColumnInfo>, TargetError> {
        let rows = self
            .client
            .query(TABLE_COLUMNS_QUERY, &[&schema, &table])
            .map_err(|error| self.classify(error))?;

        Ok(rows
            .iter()
            .map(|row| ColumnInfo {
                name: row.get(0),
                data_type: row.get(1),
            })
            .collect())
    }

    fn row_count(&mut self, schema: &str, table: &str) -> Result<i64, TargetError> {
        let query = format!(
            "SELECT COUNT(*) FROM {}.{}",
            quote_identifier(schema),
            quote_identifier(table)
        );
        let row = self
            .client
            .query_one(query.as_str(), &[])
            .map_err(|error| self.classify(error))?;
        Ok(row.get(0))
    }
}

fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::quote_identifier;

    #[test]
    fn quotes_identifiers_and_escapes_embedded_quotes() {
        assert_eq!(quote_identifier("fashion_leads"), "\"fashion_leads\"");
        assert_eq!(quote_identifier("odd\"name"), "\"odd\"\"name\"");
    }
}
