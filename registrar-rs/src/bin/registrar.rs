//! CLI for registrar: ping a registry, list its services, register or deregister services from JSON files.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use registrar_rs::{build_check, default_registry, resolve_hostname, RegistryAdapter, Service};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "registrar")]
#[command(about = "Register services in a service registry")]
struct Cli {
    /// Registry URI, e.g. consul://127.0.0.1:8500. Without a host the backend's default address is used.
    #[arg(long, env = "REGISTRAR_URI", default_value = "consul://")]
    registry: String,
    /// Node name for registrations (default: this machine's hostname)
    #[arg(long)]
    hostname: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the registry is reachable.
    Ping,
    /// List services known to the registry agent (JSON).
    Services,
    /// Register the services in a JSON file (one service object or an array).
    Register { file: PathBuf },
    /// Deregister the services in a JSON file.
    Deregister { file: PathBuf },
    /// Refresh the services in a JSON file.
    Refresh { file: PathBuf },
    /// Print the health check derived from each service's attributes. Does not contact the registry.
    Check { file: PathBuf },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ServiceFile {
    Many(Vec<Service>),
    One(Service),
}

fn read_services(path: &Path) -> CliResult<Vec<Service>> {
    let raw = fs::read_to_string(path)?;
    Ok(match serde_json::from_str(&raw)? {
        ServiceFile::Many(services) => services,
        ServiceFile::One(service) => vec![service],
    })
}

async fn run(cli: Cli) -> CliResult<()> {
    if let Commands::Check { file } = &cli.command {
        for service in read_services(file)? {
            let check = build_check(&service);
            println!("{}: {}", service.id, serde_json::to_string(&check)?);
        }
        return Ok(());
    }

    let hostname = cli.hostname.unwrap_or_else(resolve_hostname);
    let adapter: Box<dyn RegistryAdapter> = default_registry(hostname).build(&cli.registry)?;

    match cli.command {
        Commands::Ping => adapter.ping().await?,
        Commands::Services => {
            let services = adapter.services().await?;
            println!("{}", serde_json::to_string_pretty(&services)?);
        }
        Commands::Register { file } => {
            for service in read_services(&file)? {
                adapter.register(&service).await?;
                info!(service = %service.id, "registered");
            }
        }
        Commands::Deregister { file } => {
            for service in read_services(&file)? {
                adapter.deregister(&service).await?;
                info!(service = %service.id, "deregistered");
            }
        }
        Commands::Refresh { file } => {
            for service in read_services(&file)? {
                adapter.refresh(&service).await?;
            }
        }
        Commands::Check { .. } => {}
    }
    Ok(())
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(run(cli))
}
