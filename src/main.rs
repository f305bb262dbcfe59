use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use counselor_notify::handler::{Outcome, Processor};
use counselor_notify::mailer::SmtpMailer;
use counselor_notify::sheets::JsonWorkbookStore;
use counselor_notify::{Config, FormEvent};

/// counselor-notify - routes student counselor requests to counselor mailboxes
#[derive(Parser)]
#[command(name = "counselor-notify")]
#[command(about = "Routes student counselor-request form submissions to counselor mailboxes", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process one form submission event (JSON with a "values" array)
    Process {
        /// Path to the event JSON; reads stdin when omitted
        #[arg(long)]
        event: Option<PathBuf>,
    },
    /// Ensure checkbox controls on the counselor tracking sheets
    RefreshCheckboxes,
    /// Load and validate configuration, then print the active routing summary
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    counselor_notify::observability::init_observability(
        &config.logging.level,
        &config.logging.format,
    )?;

    match cli.command {
        Commands::Process { event } => process_command(config, event).await,
        Commands::RefreshCheckboxes => refresh_command(config).await,
        Commands::CheckConfig => check_config_command(config),
    }
}

fn build_processor(config: Config) -> Result<Processor> {
    let mailer = Arc::new(SmtpMailer::new(&config.smtp)?);
    let sheets = Arc::new(JsonWorkbookStore::open(&config.sheets.workbook_path)?);
    Ok(Processor::new(config, mailer, sheets))
}

#[tracing::instrument(skip(config, event_path))]
async fn process_command(config: Config, event_path: Option<PathBuf>) -> Result<()> {
    let raw = match event_path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    // An empty payload is the no-event case, not a parse error
    let event: Option<FormEvent> = if raw.trim().is_empty() {
        None
    } else {
        Some(serde_json::from_str(&raw)?)
    };

    let processor = build_processor(config)?;
    match processor.process(event.as_ref()).await {
        Outcome::Ignored => tracing::info!("No submission payload, nothing to do"),
        Outcome::Failed => anyhow::bail!("submission could not be processed, administrator alerted"),
        Outcome::Sent {
            recipients,
            broadcast,
        } => tracing::info!(
            to = %recipients.join(", "),
            broadcast,
            "Submission processed"
        ),
    }

    Ok(())
}

#[tracing::instrument(skip(config))]
async fn refresh_command(config: Config) -> Result<()> {
    let processor = build_processor(config)?;
    if !processor.refresh_checkboxes().await {
        anyhow::bail!("checkbox refresh failed for at least one sheet, administrator alerted");
    }
    Ok(())
}

fn check_config_command(config: Config) -> Result<()> {
    println!("environment: {}", config.notify.environment);
    println!("admin email: {}", config.notify.admin_email);
    println!("subject:     {}", config.notify.subject);
    println!("routes:      {}", config.active_routes().len());
    println!("sheets:      {}", config.sheets.names.len());
    Ok(())
}
