use crate::cli::ConfigAction;
use aiodl::config::ConfigManager;
use anyhow::Result;
use console::{Term, style};

pub async fn handle_config(config_manager: &ConfigManager, action: ConfigAction) -> Result<bool> {
    let term = Term::stdout();

    match action {
        ConfigAction::Show => {
            let config_content = std::fs::read_to_string(config_manager.config_file())?;
            term.write_line(&format!("{} Current configuration:", style("⚙️").cyan()))?;
            term.write_line("")?;
            term.write_line(&config_content)?;
        }

        ConfigAction::Path => {
            term.write_line(&config_manager.config_file().display().to_string())?;
        }

        ConfigAction::Sample => {
            let sample = config_manager.create_sample_config()?;
            term.write_line(&format!(
                "{} Sample configuration written to {}",
                style("📝").cyan(),
                style(sample.display()).cyan()
            ))?;
        }

        ConfigAction::Validate => match config_manager.validate() {
            Ok(()) => {
                term.write_line(&format!("{} Configuration is valid", style("✅").green()))?;
            }
            Err(e) => {
                term.write_line(&format!(
                    "{} Configuration validation failed: {}",
                    style("❌").red(),
                    e
                ))?;
                return Ok(false);
            }
        },
    }

    Ok(true)
}
