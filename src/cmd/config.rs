//! Configuration view and validation commands: `opsdesk config`.

use std::path::Path;

use anyhow::{Context, Result, bail};

use opsdesk::config::{DeskConfig, DeskToml, project_config_path, user_config_path};

use super::super::ConfigCommands;

pub fn cmd_config(config: &DeskConfig, cwd: &Path, command: Option<ConfigCommands>) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("opsdesk Configuration");
            println!("=====================");
            println!();

            match &config.path {
                Some(path) => println!("Config file: {}", path.display()),
                None => {
                    println!("No opsdesk.toml found; using defaults.");
                    println!("Run 'opsdesk config init' to create one.");
                }
            }
            println!();

            let toml = &config.toml;
            println!("[api]");
            println!("  base_url = \"{}\"", toml.api.base_url);
            println!("  timeout_secs = {}", toml.api.timeout_secs);
            println!();
            println!("[display]");
            println!("  view = \"{}\"", toml.display.view);
            println!("  page_size = {}", toml.display.page_size);
            println!("  color = {}", toml.display.color);
            println!();
            println!("[logging]");
            println!("  level = \"{}\"", toml.logging.level);
            println!("  format = \"{}\"", toml.logging.format.as_str());
            if let Some(dir) = &toml.logging.dir {
                println!("  dir = \"{}\"", dir.display());
            }
            println!();

            println!("Effective values (with env/CLI overrides):");
            println!("  api_url = \"{}\"", config.api_url);
            println!("  log_filter = \"{}\"", config.log_filter);
            println!("  view = \"{}\"", config.view);
            println!();
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if config.path.is_none() {
                println!("No opsdesk.toml found. Using defaults.");
            }
            let warnings = config.validate();
            if warnings.is_empty() {
                println!("Configuration is valid.");
                println!();
                return Ok(());
            }
            println!("Configuration warnings:");
            for warning in &warnings {
                println!("  - {}", warning);
            }
            println!();
            bail!("Configuration has {} problem(s)", warnings.len());
        }
        Some(ConfigCommands::Init { force, user }) => {
            let path = if user {
                user_config_path().context("Could not determine the user config directory")?
            } else {
                project_config_path(cwd)
            };
            if path.exists() && !force {
                println!("Config already exists at {}", path.display());
                println!("Use --force to overwrite it.");
                return Ok(());
            }
            DeskToml::default().save(&path)?;
            println!("Created {}", path.display());
        }
    }
    Ok(())
}
