use clap::{Parser, Subcommand};
use std::collections::HashMap;

#[derive(Parser)]
#[command(name = "aiodl")]
#[command(about = "Asynchronous single-file downloader with live progress")]
#[command(long_about = "
aiodl downloads files over HTTP(S), resolving the filename, size and type from
the server before streaming the body to disk. Several URLs are downloaded
concurrently, each with its own progress bar. Press Ctrl-C to cancel.

Examples:
  aiodl get https://example.com/file.iso
  aiodl get -o downloads -s 65536 https://example.com/a.zip https://example.com/b.zip
  aiodl get -H 'Referer: https://example.com' --fake-ua https://example.com/video.mp4
  aiodl config show
")]
#[command(version)]
pub struct Cli {
    /// Override config file path
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download one or more files
    #[command(visible_alias = "dl")]
    Get {
        /// URLs to download
        #[arg(required = true)]
        urls: Vec<String>,

        /// Download directory override
        #[arg(short, long, value_name = "DIR")]
        #[arg(help = "Download to specific directory (created if missing)")]
        output_dir: Option<String>,

        /// Fixed chunk size in bytes
        #[arg(short = 's', long, value_name = "BYTES")]
        #[arg(help = "Write the body in fixed-size chunks of BYTES")]
        chunk_size: Option<usize>,

        /// Extra request header, repeatable
        #[arg(short = 'H', long = "header", value_name = "NAME: VALUE")]
        #[arg(help = "Extra request header (repeatable), e.g. 'Referer: https://example.com'")]
        headers: Vec<String>,

        /// Send a desktop browser user agent
        #[arg(long)]
        #[arg(help = "Send a desktop browser user agent")]
        fake_ua: bool,

        /// Skip TLS certificate verification
        #[arg(short = 'k', long)]
        #[arg(help = "Accept invalid TLS certificates")]
        insecure: bool,

        /// Connect over IPv4 only
        #[arg(short = '4', long, conflicts_with = "ipv6")]
        ipv4: bool,

        /// Connect over IPv6 only
        #[arg(short = '6', long)]
        ipv6: bool,

        /// Abort a transfer when a read stalls for SECS seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Print final statuses as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    #[command(visible_alias = "cfg")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file location
    Path,

    /// Create sample configuration
    Sample,

    /// Validate configuration
    #[command(visible_alias = "check")]
    Validate,
}

impl Cli {
    /// Validate CLI arguments and show helpful error messages
    pub fn validate(&self) -> Result<(), String> {
        if let Commands::Get {
            urls,
            chunk_size,
            headers,
            timeout,
            ..
        } = &self.command
        {
            if urls.iter().any(|u| u.trim().is_empty()) {
                return Err("URL cannot be empty".to_string());
            }
            if *chunk_size == Some(0) {
                return Err("Chunk size must be greater than 0".to_string());
            }
            if *timeout == Some(0) {
                return Err("Timeout must be greater than 0".to_string());
            }
            parse_headers(headers)?;
        }
        Ok(())
    }

    /// Check if the command reads the configuration without relying on it being valid
    pub fn skips_config_validation(&self) -> bool {
        matches!(
            self.command,
            Commands::Config {
                action: ConfigAction::Validate | ConfigAction::Path | ConfigAction::Show
            }
        )
    }
}

/// Parse `Name: value` pairs into a header map.
pub fn parse_headers(raw: &[String]) -> Result<HashMap<String, String>, String> {
    let mut headers = HashMap::new();
    for entry in raw {
        let (name, value) = entry
            .split_once(':')
            .ok_or_else(|| format!("Invalid header '{}', expected 'Name: value'", entry))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(format!("Invalid header '{}', name is empty", entry));
        }
        headers.insert(name.to_string(), value.trim().to_string());
    }
    Ok(headers)
}
