use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use vigil_service::{build_scheduler, cancel_on_signal};
use vigil_service::config::Config;
use vigil_service::database::models::NewService;
use vigil_service::database::{Store, open_store};
use vigil_service::monitoring::validation::validate_service_url;

#[derive(Parser, Debug)]
#[command(author, version, about = "HTTP status monitor", long_about = None)]
struct Cli {
    /// Path to config TOML file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Monitor all services until interrupted (default)
    Run,
    /// Run a single monitoring cycle and exit
    Check,
    /// Delete data older than the retention window now
    Cleanup,
    /// Manage monitored services
    #[command(subcommand)]
    Services(ServicesCommand),
    /// Print the effective configuration
    Config,
}

#[derive(Subcommand, Debug)]
enum ServicesCommand {
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        url: String,
        #[arg(long)]
        description: Option<String>,
    },
    Remove {
        id: Uuid,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logger::init_tracing();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    let command = cli.command.unwrap_or(Command::Run);
    if let Command::Config = command {
        print!("{}", config);
        return Ok(());
    }

    let store: Arc<dyn Store> = Arc::new(open_store(&config.database.path).await?);

    match command {
        Command::Run => run(&config, store).await,
        Command::Check => {
            let mut scheduler = build_scheduler(&config, store)?;
            let report = scheduler.run_tick(&CancellationToken::new()).await;
            println!("{}", report);
            Ok(())
        }
        Command::Cleanup => {
            let mut scheduler = build_scheduler(&config, store)?;
            match scheduler.run_retention(Utc::now()).await {
                Some(report) => {
                    println!(
                        "Deleted {} status checks and {} daily summaries",
                        report.checks_deleted, report.summaries_deleted
                    );
                    Ok(())
                }
                None => anyhow::bail!("Retention cleanup failed"),
            }
        }
        Command::Services(cmd) => services(cmd, store.as_ref()).await,
        Command::Config => Ok(()),
    }
}

async fn run(config: &Config, store: Arc<dyn Store>) -> Result<()> {
    let scheduler = build_scheduler(config, store)?;
    let cancel = CancellationToken::new();

    tokio::spawn(cancel_on_signal(tokio::signal::ctrl_c(), cancel.clone()));

    scheduler.run(cancel).await;
    Ok(())
}

async fn services(cmd: ServicesCommand, store: &dyn Store) -> Result<()> {
    match cmd {
        ServicesCommand::List => {
            let services = store.list_services().await?;
            if services.is_empty() {
                println!("No services registered");
            }
            for service in services {
                println!("{}  {}  {}", service.id, service.name, service.url);
                if let Some(description) = service.description {
                    println!("    {}", description);
                }
            }
        }
        ServicesCommand::Add { name, url, description } => {
            validate_service_url(&url)?;
            let mut new_service = NewService::new(name, url);
            if let Some(description) = description {
                new_service = new_service.with_description(description);
            }
            let service = store.create_service(&new_service).await?;
            println!("Added {} ({})", service.name, service.id);
        }
        ServicesCommand::Remove { id } => {
            if store.delete_service(id).await? {
                println!("Removed {}", id);
            } else {
                anyhow::bail!("No service with id {}", id);
            }
        }
    }
    Ok(())
}
