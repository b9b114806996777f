//! Config command

use anyhow::{Context, Result};
use metalyzr_core::config::CONFIG_FILE_NAME;
use metalyzr_core::HierarchicalConfigLoader;

use super::load_config;
use crate::cli::{ConfigCommands, ConfigShowArgs};
use crate::output;

pub fn run(cmd: ConfigCommands, api_url: Option<&str>) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => show(args, api_url),
    }
}

fn show(args: ConfigShowArgs, api_url: Option<&str>) -> Result<()> {
    let config = load_config(api_url)?;

    if args.json {
        return output::json(&config);
    }

    let loader = HierarchicalConfigLoader::new()?;
    let config_file = loader.config_dir().join(CONFIG_FILE_NAME);
    let source = if config_file.exists() {
        config_file.to_string()
    } else {
        format!("{} (not present, using defaults)", config_file)
    };

    output::header("Resolved configuration");
    output::kv("Config file", &source);
    println!();
    let yaml = serde_yaml_ng::to_string(&config).context("Failed to render configuration")?;
    print!("{}", yaml);
    Ok(())
}
