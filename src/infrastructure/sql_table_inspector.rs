use std::sync::LazyLock;

use regex::Regex;
use sqlparser::{ast::Statement, dialect::PostgreSqlDialect, parser::Parser};
use tracing::debug;

use crate::domain::statement_batch::StatementBatch;

static CREATE_TABLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^\s*create\s+(?:(?:temp|temporary|unlogged)\s+)?table\s+(?:if\s+not\s+exists\s+)?([A-Za-z0-9_."]+)"#)
        .expect("create table pattern should compile")
});

/// Name of the first table created by the batch, without schema qualifier or quotes.
pub fn find_created_table(batch: &StatementBatch) -> Option<String> {
    batch.iter().find_map(created_table_name)
}

fn created_table_name(statement: &str) -> Option<String> {
    match Parser::parse_sql(&PostgreSqlDialect {}, statement) {
        Ok(parsed) => parsed.into_iter().find_map(|parsed_statement| match parsed_statement {
            Statement::CreateTable(create_table) => {
                Some(unqualified_name(&create_table.name.to_string()))
            }
            _ => None,
        }),
        Err(error) => {
            debug!(%error, "sql parser rejected statement, falling back to pattern match");
            CREATE_TABLE_PATTERN
                .captures(statement)
                .map(|captures| unqualified_name(&captures[1]))
        }
    }
}

fn unqualified_name(qualified: &str) -> String {
    qualified
        .rsplit('.')
        .next()
        .unwrap_or(qualified)
        .trim_matches('"')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::{created_table_name, find_created_table};
    use crate::domain::statement_batch::StatementBatch;

    #[test]
    fn finds_first_created_table_in_batch() {
        let batch = StatementBatch::parse(
            "CREATE EXTENSION IF NOT EXISTS pgcrypto;\n\
             CREATE TABLE IF NOT EXISTS fashion_leads (id SERIAL PRIMARY KEY);\n\
             CREATE TABLE other (id INT);",
        );

        assert_eq!(find_created_table(&batch), Some("fashion_leads".to_string()));
    }

    #[test]
    fn shipped_script_targets_fashion_leads() {
        let batch = StatementBatch::parse(include_str!("../../create_fashion_leads_table.sql"));

        assert_eq!(batch.len(), 6);
        assert_eq!(find_created_table(&batch), Some("fashion_leads".to_string()));
    }

    #[test]
    fn strips_schema_and_quotes() {
        assert_eq!(
            created_table_name(r#"CREATE TABLE "public"."Saas_Leads" (id INT)"#),
            Some("Saas_Leads".to_string())
        );
    }

    #[test]
    fn falls_back_to_pattern_when_parser_rejects_statement() {
        assert_eq!(
            created_table_name(
                "CREATE TABLE IF NOT EXISTS ecom_leads (id SERIAL PRIMARY KEY, ip_address INET"
            ),
            Some("ecom_leads".to_string())
        );
    }

    #[test]
    fn batch_without_create_table_has_no_target() {
        let batch = StatementBatch::parse(
            "ALTER TABLE fashion_leads ENABLE ROW LEVEL SECURITY; SELECT 1;",
        );
        assert_eq!(find_created_table(&batch), None);
    }
}
