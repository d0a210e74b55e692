use aiodl::config::{Config, ConfigManager};
use aiodl::download::format_duration;
use aiodl::{Downloader, IpFamily, TransferId, TransferOptions, TransferStatus};
use anyhow::Result;
use chrono::Utc;
use console::{Term, style};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::time::Duration;
use tracing::warn;

const PROGRESS_REFRESH: Duration = Duration::from_millis(200);

/// Flags of the `get` command.
#[derive(Debug, Clone, Default)]
pub struct GetArgs {
    pub urls: Vec<String>,
    pub output_dir: Option<String>,
    pub chunk_size: Option<usize>,
    pub headers: HashMap<String, String>,
    pub fake_ua: bool,
    pub insecure: bool,
    pub ip_family: Option<IpFamily>,
    pub timeout: Option<u64>,
    pub json: bool,
}

/// Configuration values overridden by whatever was given on the command line.
pub fn build_options(config: &Config, args: &GetArgs) -> TransferOptions {
    let mut options = config.transfer_options().with_headers(args.headers.clone());

    if let Some(dir) = &args.output_dir {
        options = options.with_download_dir(dir);
    }
    if let Some(chunk_size) = args.chunk_size {
        options = options.with_chunk_size(chunk_size);
    }
    if args.fake_ua {
        options.fake_user_agent = true;
    }
    if args.insecure {
        options.transport.accept_invalid_certs = true;
    }
    if let Some(family) = args.ip_family {
        options.transport.ip_family = family;
    }
    if let Some(secs) = args.timeout {
        options.transport.read_timeout_secs = Some(secs);
    }

    options
}

/// Download every URL concurrently. Returns `false` if any transfer did not complete.
pub async fn handle_get(config_manager: &ConfigManager, args: GetArgs) -> Result<bool> {
    let term = Term::stdout();
    let options = build_options(config_manager.config(), &args);
    let downloader = Downloader::new();
    let multi = MultiProgress::new();

    let mut all_ok = true;
    let mut bars: Vec<(TransferId, ProgressBar)> = Vec::new();

    for url in &args.urls {
        match downloader.start(url, options.clone()) {
            Ok(id) => {
                let pb = multi.add(ProgressBar::new_spinner());
                pb.set_style(spinner_style()?);
                pb.set_message(url.clone());
                pb.enable_steady_tick(Duration::from_millis(100));
                bars.push((id, pb));
            }
            Err(e) => {
                term.write_line(&format!("{} {}: {}", style("❌").red(), url, e))?;
                all_ok = false;
            }
        }
    }

    let mut ticker = tokio::time::interval(PROGRESS_REFRESH);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    while !bars.is_empty() {
        tokio::select! {
            _ = &mut ctrl_c => {
                warn!("Interrupted, cancelling {} transfer(s)", bars.len());
                downloader.shutdown().await;
                refresh_bars(&downloader, &bars)?;
                break;
            }
            _ = ticker.tick() => {
                if refresh_bars(&downloader, &bars)? {
                    break;
                }
            }
        }
    }

    let statuses: Vec<TransferStatus> = bars
        .iter()
        .filter_map(|(id, _)| downloader.status(id))
        .collect();

    if args.json {
        term.write_line(&serde_json::to_string_pretty(&statuses)?)?;
    } else {
        for status in &statuses {
            print_summary(&term, status)?;
        }
    }

    Ok(all_ok && statuses.iter().all(|s| s.complete))
}

/// Redraw every bar from its transfer's status. Returns `true` once all transfers finished.
fn refresh_bars(downloader: &Downloader, bars: &[(TransferId, ProgressBar)]) -> Result<bool> {
    let mut all_finished = true;

    for (id, pb) in bars {
        let Some(status) = downloader.status(id) else {
            continue;
        };
        if pb.is_finished() {
            continue;
        }

        if status.total_size > 0 && pb.length() != Some(status.total_size) {
            pb.set_length(status.total_size);
            pb.set_style(bar_style()?);
        }
        pb.set_position(status.downloaded);

        if status.is_terminal() {
            let outcome = if status.complete {
                format!("{} {}", style("✅").green(), status.filename)
            } else if status.is_cancelled() {
                format!("{} {} cancelled", style("🛑").yellow(), status.filename)
            } else {
                format!("{} {} failed", style("❌").red(), status.filename)
            };
            pb.finish_with_message(outcome);
        } else {
            all_finished = false;
            pb.set_message(format!(
                "{} {} ETA {}",
                status.filename, status.speed, status.eta
            ));
        }
    }

    Ok(all_finished)
}

fn print_summary(term: &Term, status: &TransferStatus) -> Result<()> {
    let elapsed = status
        .started_at
        .and_then(|started| Utc::now().signed_duration_since(started).to_std().ok())
        .map(format_duration)
        .unwrap_or_else(|| "-".to_string());

    if status.complete {
        let path = status
            .destination_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        term.write_line(&format!(
            "{} {} ({}) saved to {} in {}",
            style("✅").green(),
            style(&status.filename).cyan().bold(),
            status.total_size_str,
            style(path).cyan(),
            elapsed
        ))?;
        if let Some(file_type) = &status.file_type {
            term.write_line(&format!("   {}: {}", style("Type").dim(), file_type))?;
        }
    } else {
        term.write_line(&format!(
            "{} {}: {} ({} of {} downloaded)",
            style("❌").red(),
            style(&status.url).cyan(),
            status.error.as_deref().unwrap_or("unknown error"),
            status.downloaded_str,
            status.total_size_str
        ))?;
    }

    Ok(())
}

fn spinner_style() -> Result<ProgressStyle> {
    Ok(ProgressStyle::default_spinner().template("{spinner:.blue} {bytes} {msg}")?)
}

fn bar_style() -> Result<ProgressStyle> {
    Ok(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:.cyan/blue}] {bytes}/{total_bytes} {msg}")?
        .progress_chars("#>-"))
}
