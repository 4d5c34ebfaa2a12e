//! Config command handler

use std::path::Path;

use anyhow::Result;
use colored::*;

use super::ConfigCommands;
use crate::config::Config;

pub fn handle_config_command(command: ConfigCommands, config_path: Option<&Path>) -> Result<i32> {
    match command {
        ConfigCommands::Show => {
            let config = Config::load(config_path)?;
            print!("{}", render(&config));
        }
        ConfigCommands::Path => match Config::default_path() {
            Some(path) => println!("{}", path.display()),
            None => println!("{}", "No user config directory on this platform".yellow()),
        },
    }
    Ok(0)
}

fn render(config: &Config) -> String {
    let unset = || "(not set)".dimmed().to_string();
    let mut out = String::new();
    let mut line = |key: &str, value: String| out.push_str(&format!("{:<18} {}\n", key.bold(), value));

    line(
        "config file",
        config
            .source_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(unset),
    );
    line("ckan_url", config.ckan_url.clone().unwrap_or_else(unset));
    line("api_key", config.masked_api_key().unwrap_or_else(unset));
    line("user_agent", config.user_agent.clone());
    line("inputs_url", config.inputs_url.clone());
    line("group_key", format!("{:?}", config.build.group_key).to_lowercase());
    line("crowdsourced_tag", config.build.crowdsourced_tag.to_string());
    line("resource_format", format!("{:?}", config.build.resource_format));
    out
}
