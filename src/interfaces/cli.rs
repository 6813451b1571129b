use std::{env, path::PathBuf};

use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand};
use console::style;
use dialoguer::{Input, Select, theme::ColorfulTheme};

use crate::{
    application::commands::SplitPdfCommand,
    domain::project::{ConnectionOverrides, DEFAULT_DB_NAME, DEFAULT_DB_PORT, DEFAULT_DB_USER},
};

const DEFAULT_SQL_FILE: &str = "create_fashion_leads_table.sql";
const DEFAULT_SCHEMA: &str = "public";
const DEFAULT_ENV_FILE: &str = ".env";
const DEFAULT_PDF_INPUT: &str = "fashion/Fashion Campaign to increase ROAS.pdf";
const DEFAULT_PARTS: usize = 3;

#[derive(Debug, Parser)]
#[command(
    name = "leadkit",
    version,
    about = "Provision lead tables in a Supabase database and split campaign PDFs"
)]
struct CliArgs {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Run a SQL script against the project database and verify the table
    ProvisionTable(ProvisionTableArgs),
    /// Split a PDF into parts of roughly equal page counts
    SplitPdf(SplitPdfArgs),
}

#[derive(Debug, Args)]
struct ProvisionTableArgs {
    #[arg(long, short = 'f', default_value = DEFAULT_SQL_FILE)]
    sql_file: PathBuf,
    #[arg(long, short = 't', help = "Table to verify (defaults to the first CREATE TABLE)")]
    table: Option<String>,
    #[arg(long, default_value = DEFAULT_SCHEMA)]
    schema: String,
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,
    #[arg(long, default_value_t = DEFAULT_DB_PORT)]
    db_port: u16,
    #[arg(long, default_value = DEFAULT_DB_NAME)]
    db_name: String,
    #[arg(long, default_value = DEFAULT_DB_USER)]
    db_user: String,
}

#[derive(Debug, Args)]
struct SplitPdfArgs {
    #[arg(help = "PDF to split")]
    input: Option<PathBuf>,
    #[arg(long, short = 'n', default_value_t = DEFAULT_PARTS)]
    parts: usize,
    #[arg(long, short = 'o', help = "Directory for the parts (defaults to the input's)")]
    output_dir: Option<PathBuf>,
}

#[derive(Debug)]
pub struct ProvisionTableRequest {
    pub sql_file: PathBuf,
    pub table: Option<String>,
    pub schema: String,
    pub env_file: PathBuf,
    pub overrides: ConnectionOverrides,
}

#[derive(Debug)]
pub enum CliRequest {
    ProvisionTable(ProvisionTableRequest),
    SplitPdf(SplitPdfCommand),
}

pub fn collect_request() -> Result<CliRequest> {
    if env::args_os().len() == 1 {
        return collect_interactive_request();
    }
    collect_request_from_args(CliArgs::parse())
}

fn collect_request_from_args(args: CliArgs) -> Result<CliRequest> {
    match args.command {
        CliCommand::ProvisionTable(args) => {
            let table = args
                .table
                .map(|table| ensure_non_empty_value(table, "Table"))
                .transpose()?;

            Ok(CliRequest::ProvisionTable(ProvisionTableRequest {
                sql_file: args.sql_file,
                table,
                schema: ensure_non_empty_value(args.schema, "Schema")?,
                env_file: args.env_file,
                overrides: ConnectionOverrides {
                    port: args.db_port,
                    database: ensure_non_empty_value(args.db_name, "Database name")?,
                    user: ensure_non_empty_value(args.db_user, "Database user")?,
                },
            }))
        }
        CliCommand::SplitPdf(args) => {
            if args.parts == 0 {
                return Err(anyhow!("Part count must be greater than 0"));
            }

            Ok(CliRequest::SplitPdf(SplitPdfCommand {
                input_path: args.input.unwrap_or_else(|| PathBuf::from(DEFAULT_PDF_INPUT)),
                parts: args.parts,
                output_dir: args.output_dir,
            }))
        }
    }
}

fn collect_interactive_request() -> Result<CliRequest> {
    let theme = ColorfulTheme::default();

    println!();
    println!(
        "{}",
        style(" LEADKIT ").black().on_cyan().bold().underlined()
    );
    println!("{}", style("Lead table provisioning and PDF splitting").dim());
    println!();

    let tool_options = ["Provision a table from a SQL file", "Split a PDF into parts"];
    let tool_index = Select::with_theme(&theme)
        .with_prompt("Utility")
        .default(0)
        .items(&tool_options)
        .interact()?;

    if tool_index == 0 {
        collect_interactive_provision(&theme)
    } else {
        collect_interactive_split(&theme)
    }
}

fn collect_interactive_provision(theme: &ColorfulTheme) -> Result<CliRequest> {
    let sql_file: String = Input::with_theme(theme)
        .with_prompt("SQL file path")
        .default(DEFAULT_SQL_FILE.to_string())
        .interact_text()?;

    let table: String = Input::with_theme(theme)
        .with_prompt("Table to verify (empty to use the first CREATE TABLE)")
        .allow_empty(true)
        .interact_text()?;

    let env_file: String = Input::with_theme(theme)
        .with_prompt("Env file")
        .default(DEFAULT_ENV_FILE.to_string())
        .interact_text()?;

    let table = Some(table.trim().to_string()).filter(|table| !table.is_empty());

    Ok(CliRequest::ProvisionTable(ProvisionTableRequest {
        sql_file: PathBuf::from(sql_file.trim()),
        table,
        schema: DEFAULT_SCHEMA.to_string(),
        env_file: PathBuf::from(env_file.trim()),
        overrides: ConnectionOverrides::default(),
    }))
}

fn collect_interactive_split(theme: &ColorfulTheme) -> Result<CliRequest> {
    let input: String = Input::with_theme(theme)
        .with_prompt("PDF file path")
        .default(DEFAULT_PDF_INPUT.to_string())
        .interact_text()?;

    let parts: usize = Input::with_theme(theme)
        .with_prompt("Number of parts")
        .default(DEFAULT_PARTS)
        .validate_with(|value: &usize| {
            if *value == 0 {
                Err("Number of parts must be greater than 0")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    Ok(CliRequest::SplitPdf(SplitPdfCommand {
        input_path: PathBuf::from(input.trim()),
        parts,
        output_dir: None,
    }))
}

fn ensure_non_empty_value(value: String, field_name: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("{field_name} must not be empty"));
    }
    Ok(trimmed.to_string())
}
