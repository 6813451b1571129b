const STATEMENT_DELIMITER: char = ';';
const COMMENT_PREFIX: &str = "--";
const PREVIEW_MAX_CHARS: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementBatch {
    statements: Vec<String>,
}

impl StatementBatch {
    /// Splits a script on `;`, dropping `--` comment lines and entries left empty.
    pub fn parse(content: &str) -> Self {
        let statements = content
            .split(STATEMENT_DELIMITER)
            .map(strip_comment_lines)
            .filter(|statement| !statement.is_empty())
            .collect();

        Self { statements }
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.statements.iter().map(String::as_str)
    }
}

fn strip_comment_lines(chunk: &str) -> String {
    chunk
        .lines()
        .filter(|line| !line.trim_start().starts_with(COMMENT_PREFIX))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

pub fn statement_preview(statement: &str) -> String {
    let first_line = statement.lines().next().unwrap_or_default().trim();
    if first_line.chars().count() <= PREVIEW_MAX_CHARS {
        return first_line.to_string();
    }

    let mut preview = first_line.chars().take(PREVIEW_MAX_CHARS).collect::<String>();
    preview.push_str("...");
    preview
}

#[cfg(test)]
mod tests {
    use super::{StatementBatch, statement_preview};

    const FASHION_SCRIPT: &str = r#"
-- Create fashion_leads table
CREATE TABLE IF NOT EXISTS fashion_leads (
    id SERIAL PRIMARY KEY,
    email VARCHAR(255) NOT NULL UNIQUE
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_fashion_leads_email ON fashion_leads(email);
CREATE INDEX IF NOT EXISTS idx_fashion_leads_created_at ON fashion_leads(created_at);

ALTER TABLE fashion_leads ENABLE ROW LEVEL SECURITY;

-- trailing comment only
"#;

    #[test]
    fn keeps_statements_that_follow_comment_lines() {
        let batch = StatementBatch::parse(FASHION_SCRIPT);
        let statements = batch.iter().collect::<Vec<_>>();

        assert_eq!(batch.len(), 4);
        assert!(statements[0].starts_with("CREATE TABLE IF NOT EXISTS fashion_leads ("));
        assert!(statements[0].ends_with(')'));
        assert_eq!(
            statements[1],
            "CREATE INDEX IF NOT EXISTS idx_fashion_leads_email ON fashion_leads(email)"
        );
        assert_eq!(statements[3], "ALTER TABLE fashion_leads ENABLE ROW LEVEL SECURITY");
    }

    #[test]
    fn comment_only_and_blank_scripts_produce_empty_batch() {
        assert!(StatementBatch::parse("").is_empty());
        assert!(StatementBatch::parse(" ;\n;  ;").is_empty());
        assert!(StatementBatch::parse("-- nothing here\n  -- still nothing;\n").is_empty());
    }

    #[test]
    fn last_statement_without_delimiter_is_kept() {
        let batch = StatementBatch::parse("SELECT 1; SELECT 2");
        assert_eq!(batch.iter().collect::<Vec<_>>(), vec!["SELECT 1", "SELECT 2"]);
    }

    #[test]
    fn preview_uses_first_line_and_truncates() {
        assert_eq!(
            statement_preview("CREATE TABLE t (\n  id INT\n)"),
            "CREATE TABLE t ("
        );

        let long_statement = format!("SELECT {}", "x".repeat(100));
        let preview = statement_preview(&long_statement);
        assert_eq!(preview.chars().count(), 63);
        assert!(preview.ends_with("..."));
    }
}
