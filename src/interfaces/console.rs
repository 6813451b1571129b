use std::{env, fs, path::Path};

use anyhow::{Context, Result, anyhow};
use console::style;
use dialoguer::{Password, theme::ColorfulTheme};
use tracing::{debug, error, warn};

use crate::{
    application::{
        commands::{ProvisionTableCommand, ProvisionTableResult, SplitPdfCommand, TableVerification},
        use_cases::{
            provision_table::{ProvisionTableUseCase, StatementProgress},
            split_pdf::SplitPdfUseCase,
        },
    },
    domain::{
        execution::StatementOutcome,
        project::{ConnectionConfig, ProjectRef, ProjectSettings},
        statement_batch::StatementBatch,
    },
    infrastructure::{postgres_target::PostgresTarget, sql_table_inspector::find_created_table},
    interfaces::cli::ProvisionTableRequest,
};

/// Everything the provisioner needs before it opens a connection.
#[derive(Debug)]
struct ProvisionPlan {
    project: ProjectRef,
    config: ConnectionConfig,
    batch: StatementBatch,
    table: String,
}

pub fn run_provision_table(request: ProvisionTableRequest) -> Result<()> {
    load_env_file(&request.env_file)?;
    let plan = plan_provisioning(&request, |key| env::var(key).ok(), prompt_password)?;

    println!();
    println!("{}", style("Connecting to the project database...").cyan());
    let mut target = match PostgresTarget::connect(&plan.config) {
        Ok(target) => target,
        Err(connect_error) => {
            error!(error = %connect_error, host = %plan.config.host, "database connection failed");
            print_fallback(&plan.project, &request.sql_file, &connect_error.to_string());
            return Err(anyhow!(connect_error).context("Unable to connect to the database"));
        }
    };
    println!("{}", style("Connected").green());
    println!(
        "{} {} {}",
        style("Executing").cyan(),
        plan.batch.len(),
        style(format!(
            "SQL statements from {}",
            request.sql_file.display()
        ))
        .cyan()
    );

    let command = ProvisionTableCommand {
        batch: plan.batch,
        schema: request.schema,
        table: plan.table,
    };
    let table = command.table.clone();
    let result = match ProvisionTableUseCase.execute(command, &mut target, print_progress) {
        Ok(result) => result,
        Err(provision_error) => {
            error!(error = %provision_error, "provisioning aborted");
            print_fallback(&plan.project, &request.sql_file, &provision_error.to_string());
            return Err(provision_error.into());
        }
    };

    print_provision_summary(&table, &result);
    Ok(())
}

/// Resolves configuration, the statement batch and the target table, and only then asks for
/// the password.
fn plan_provisioning(
    request: &ProvisionTableRequest,
    lookup: impl Fn(&str) -> Option<String>,
    password: impl FnOnce() -> Result<String>,
) -> Result<ProvisionPlan> {
    let settings = ProjectSettings::from_lookup(lookup)?;
    let project = settings.project;

    let sql_content = fs::read_to_string(&request.sql_file).with_context(|| {
        format!("Unable to read SQL file {}", request.sql_file.display())
    })?;
    let batch = StatementBatch::parse(&sql_content);
    if batch.is_empty() {
        warn!(path = %request.sql_file.display(), "sql file contains no statements");
    }
    let table = match &request.table {
        Some(table) => table.clone(),
        None => find_created_table(&batch).ok_or_else(|| {
            anyhow!(
                "No CREATE TABLE statement found in {}; pass --table to choose the table to verify",
                request.sql_file.display()
            )
        })?,
    };

    println!(
        "{} {}",
        style("Setting up table").cyan(),
        style(&table).bold()
    );
    println!("{} {}", style("Project:").dim(), project.id());
    if settings.has_service_key {
        println!("{}", style("Service role key found").dim());
    }
    println!();

    let password = password()?;
    let config = ConnectionConfig::for_project(&project, &password, request.overrides.clone())?;

    Ok(ProvisionPlan {
        project,
        config,
        batch,
        table,
    })
}

fn prompt_password() -> Result<String> {
    println!(
        "{}",
        style("The database password is under Project Settings > Database in the dashboard").yellow()
    );
    let password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Database password")
        .allow_empty_password(true)
        .interact()?;
    Ok(password)
}

pub fn run_split_pdf(command: SplitPdfCommand) -> Result<()> {
    println!(
        "{} {} {} {}",
        style("Splitting").cyan(),
        style(command.input_path.display()).bold(),
        style("into").cyan(),
        command.parts
    );

    let result = SplitPdfUseCase.execute(command, |part| {
        println!(
            "{} {} (pages {})",
            style("Created").green(),
            style(part.output_path.display()).bold(),
            part.range.display_range()
        );
    })?;

    println!(
        "{} {} pages into {} files",
        style("Split").green(),
        result.total_pages,
        result.parts.len()
    );
    Ok(())
}

fn load_env_file(path: &Path) -> Result<()> {
    if !path.exists() {
        debug!(path = %path.display(), "env file not found, using process environment");
        return Ok(());
    }

    dotenvy::from_path(path)
        .with_context(|| format!("Unable to load env file {}", path.display()))?;
    debug!(path = %path.display(), "loaded env file");
    Ok(())
}

fn print_progress(progress: StatementProgress<'_>) {
    let status = match progress.outcome {
        StatementOutcome::Executed => style("ok".to_string()).green(),
        StatementOutcome::AlreadyExists => style("already exists, skipped".to_string()).blue(),
        StatementOutcome::Failed(failure) => style(format!("error: {failure}")).red(),
    };
    println!(
        "  [{}/{}] {} {}",
        progress.index,
        progress.total,
        style(&progress.preview).dim(),
        status
    );
}

fn print_provision_summary(table: &str, result: &ProvisionTableResult) {
    println!();
    println!("{}", style("Summary").bold());
    println!(
        "  {} {}",
        style("Successful:").green(),
        result.tally.successes
    );
    if result.tally.already_existing > 0 {
        println!(
            "  {} {}",
            style("Already existing:").blue(),
            result.tally.already_existing
        );
    }
    println!("  {} {}", style("Errors:").red(), result.tally.errors);
    println!();

    match &result.verification {
        TableVerification::Verified { columns, row_count } => {
            println!(
                "{} {}",
                style("Verified table").green(),
                style(table).bold()
            );
            println!("{}", style("Table structure:").bold());
            for column in columns {
                println!("  - {}: {}", column.name, column.data_type);
            }
            match row_count {
                Some(count) => println!("{} {}", style("Current rows:").dim(), count),
                None => println!("{}", style("Current rows: unavailable").dim()),
            }
            println!();
            println!("{}", style("Setup complete").green().bold());
        }
        TableVerification::Missing => {
            println!(
                "{} {}",
                style("Table verification failed, not found:").red(),
                style(table).bold()
            );
        }
    }
}

fn print_fallback(project: &ProjectRef, sql_file: &Path, reason: &str) {
    eprintln!();
    eprintln!("{} {}", style("Database error:").red().bold(), reason);
    eprintln!();
    eprintln!("{}", style("Run the SQL manually instead:").yellow());
    for step in fallback_steps(project, sql_file) {
        eprintln!("  {step}");
    }
}

fn fallback_steps(project: &ProjectRef, sql_file: &Path) -> Vec<String> {
    vec![
        format!("1. Go to: {}", project.editor_url()),
        "2. Open the SQL Editor".to_string(),
        format!("3. Copy and paste the contents of {}", sql_file.display()),
        "4. Run the query".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use std::{
        cell::Cell,
        collections::HashMap,
        fs,
        path::{Path, PathBuf},
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::{fallback_steps, plan_provisioning};
    use crate::{
        domain::project::{ConfigError, ConnectionOverrides, ProjectRef, URL_VAR},
        interfaces::cli::ProvisionTableRequest,
    };

    fn build_temp_sql_file(content: &str) -> PathBuf {
        let unique_suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("leadkit_console_{unique_suffix}.sql"));
        fs::write(&path, content).expect("temp sql file should be written");
        path
    }

    fn request(sql_file: PathBuf) -> ProvisionTableRequest {
        ProvisionTableRequest {
            sql_file,
            table: None,
            schema: "public".to_string(),
            env_file: PathBuf::from(".env"),
            overrides: ConnectionOverrides::default(),
        }
    }

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| values.get(key).cloned()
    }

    #[test]
    fn missing_url_fails_before_password_prompt() {
        let sql_file = build_temp_sql_file("CREATE TABLE fashion_leads (id INT);");
        let prompted = Cell::new(false);

        let error = plan_provisioning(&request(sql_file.clone()), lookup_from(&[]), || {
            prompted.set(true);
            Ok("secret".to_string())
        })
        .expect_err("missing url should be rejected");

        assert_eq!(
            error.downcast_ref::<ConfigError>(),
            Some(&ConfigError::MissingUrl)
        );
        assert!(!prompted.get());

        fs::remove_file(sql_file).expect("temp sql file should be removed");
    }

    #[test]
    fn empty_password_is_rejected_after_prompt() {
        let sql_file = build_temp_sql_file("CREATE TABLE fashion_leads (id INT);");

        let error = plan_provisioning(
            &request(sql_file.clone()),
            lookup_from(&[(URL_VAR, "https://abcd.supabase.co")]),
            || Ok("   ".to_string()),
        )
        .expect_err("empty password should be rejected");

        assert_eq!(
            error.downcast_ref::<ConfigError>(),
            Some(&ConfigError::EmptyPassword)
        );

        fs::remove_file(sql_file).expect("temp sql file should be removed");
    }

    #[test]
    fn plan_infers_table_and_builds_connection() {
        let sql_file = build_temp_sql_file(
            "-- leads\nCREATE TABLE IF NOT EXISTS fashion_leads (id INT);\nCREATE INDEX i ON fashion_leads(id);",
        );

        let plan = plan_provisioning(
            &request(sql_file.clone()),
            lookup_from(&[(URL_VAR, "https://abcd.supabase.co")]),
            || Ok("secret".to_string()),
        )
        .expect("plan should be created");

        assert_eq!(plan.table, "fashion_leads");
        assert_eq!(plan.batch.len(), 2);
        assert_eq!(plan.config.host, "db.abcd.supabase.co");
        assert_eq!(plan.project.id(), "abcd");

        fs::remove_file(sql_file).expect("temp sql file should be removed");
    }

    #[test]
    fn fallback_points_at_project_editor_and_script() {
        let project = ProjectRef::parse("https://abcd.supabase.co").expect("url should parse");
        let steps = fallback_steps(&project, Path::new("create_fashion_leads_table.sql"));

        assert_eq!(
            steps[0],
            "1. Go to: https://supabase.com/dashboard/project/abcd/editor"
        );
        assert!(steps[2].ends_with("create_fashion_leads_table.sql"));
    }
}
