mod cli;
mod handlers;

use aiodl::{ConfigManager, IpFamily};
use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use handlers::GetArgs;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // Validate CLI arguments first
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    // Initialize logging; RUST_LOG takes precedence over --verbose
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(args.verbose))
        .init();

    let config_manager = match &args.config {
        Some(path) => ConfigManager::from_path(path)?,
        None => ConfigManager::new()?,
    };

    if !args.skips_config_validation() {
        if let Err(e) = config_manager.validate() {
            eprintln!("Configuration validation failed: {}", e);
            eprintln!("Run 'aiodl config validate' for details, or fix {:?}", config_manager.config_file());
            process::exit(1);
        }
    }

    let success = match args.command {
        Commands::Get {
            urls,
            output_dir,
            chunk_size,
            headers,
            fake_ua,
            insecure,
            ipv4,
            ipv6,
            timeout,
            json,
        } => {
            let ip_family = if ipv4 {
                Some(IpFamily::V4)
            } else if ipv6 {
                Some(IpFamily::V6)
            } else {
                None
            };
            // Already checked by `Cli::validate`.
            let headers = cli::parse_headers(&headers).map_err(anyhow::Error::msg)?;

            handlers::handle_get(
                &config_manager,
                GetArgs {
                    urls,
                    output_dir,
                    chunk_size,
                    headers,
                    fake_ua,
                    insecure,
                    ip_family,
                    timeout,
                    json,
                },
            )
            .await?
        }
        Commands::Config { action } => handlers::handle_config(&config_manager, action).await?,
    };

    if !success {
        process::exit(1);
    }

    Ok(())
}

fn log_filter(verbose: bool) -> EnvFilter {
    let default_level = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}
