mod application;
mod domain;
mod infrastructure;
mod interfaces;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::interfaces::{
    cli::{CliRequest, collect_request},
    console::{run_provision_table, run_split_pdf},
};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "leadkit=warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match collect_request()? {
        CliRequest::ProvisionTable(request) => run_provision_table(request),
        CliRequest::SplitPdf(command) => run_split_pdf(command),
    }
}
