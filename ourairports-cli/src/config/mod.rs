//! Configuration for the synchronizer
//!
//! Values are layered: built-in defaults, then the TOML config file, then
//! environment variables (a `.env` file is loaded into the environment at
//! startup), then command-line flags applied by the command handlers.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::sync::{BuildOptions, GroupKey, ResourceFormat};

/// The HXL-tagged country list maintained alongside the OurAirports datasets
pub const DEFAULT_INPUTS_URL: &str =
    "https://docs.google.com/spreadsheets/d/1CuecXwSYOeW1fa7bqs00H3unprRCAxsYFB94a3O0-Ag/edit#gid=0";

pub const DEFAULT_USER_AGENT: &str = concat!("ourairports-cli/", env!("CARGO_PKG_VERSION"));

const APP_DIR: &str = "ourairports-cli";
const CONFIG_FILE: &str = "config.toml";

pub mod env_keys {
    pub const CKAN_URL: &str = "CKAN_URL";
    pub const API_KEY: &str = "CKAN_API_KEY";
    pub const USER_AGENT: &str = "CKAN_USER_AGENT";
    pub const INPUTS_URL: &str = "OURAIRPORTS_INPUTS_URL";
}

/// On-disk shape of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub ckan_url: Option<String>,
    pub api_key: Option<String>,
    pub user_agent: Option<String>,
    pub inputs_url: Option<String>,
    pub group_key: Option<GroupKey>,
    pub crowdsourced_tag: Option<bool>,
    pub resource_format: Option<ResourceFormat>,
}

/// Effective configuration after all layers are applied
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub ckan_url: Option<String>,
    pub api_key: Option<String>,
    pub user_agent: String,
    pub inputs_url: String,
    pub build: BuildOptions,
    /// File the values were read from, if any
    pub source_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ckan_url: None,
            api_key: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            inputs_url: DEFAULT_INPUTS_URL.to_string(),
            build: BuildOptions::default(),
            source_path: None,
        }
    }
}

impl Config {
    /// `{config_dir}/ourairports-cli/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load defaults, the config file and the process environment.
    ///
    /// An explicit `path` must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        let file_path = match path {
            Some(p) => {
                if !p.exists() {
                    bail!("Config file does not exist: {}", p.display());
                }
                Some(p.to_path_buf())
            }
            None => Self::default_path().filter(|p| p.exists()),
        };

        if let Some(file_path) = file_path {
            let text = std::fs::read_to_string(&file_path)
                .with_context(|| format!("Failed to read config file: {}", file_path.display()))?;
            let file = Self::parse_file(&text)
                .with_context(|| format!("Invalid config file: {}", file_path.display()))?;
            debug!("Loaded config from {}", file_path.display());
            config.apply_file(file);
            config.source_path = Some(file_path);
        }

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn parse_file(text: &str) -> Result<FileConfig> {
        Ok(toml::from_str(text)?)
    }

    pub fn apply_file(&mut self, file: FileConfig) {
        if file.ckan_url.is_some() {
            self.ckan_url = file.ckan_url;
        }
        if file.api_key.is_some() {
            self.api_key = file.api_key;
        }
        if let Some(user_agent) = file.user_agent {
            self.user_agent = user_agent;
        }
        if let Some(inputs_url) = file.inputs_url {
            self.inputs_url = inputs_url;
        }
        if let Some(group_key) = file.group_key {
            self.build.group_key = group_key;
        }
        if let Some(crowdsourced_tag) = file.crowdsourced_tag {
            self.build.crowdsourced_tag = crowdsourced_tag;
        }
        if let Some(resource_format) = file.resource_format {
            self.build.resource_format = resource_format;
        }
    }

    /// Override from environment variables; blank values are ignored
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(env_keys::CKAN_URL) {
            self.ckan_url = Some(url);
        }
        if let Some(key) = get(env_keys::API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(agent) = get(env_keys::USER_AGENT) {
            self.user_agent = agent;
        }
        if let Some(inputs) = get(env_keys::INPUTS_URL) {
            self.inputs_url = inputs;
        }
    }

    /// Catalog URL and API key, both required for anything but a dry run
    pub fn catalog_credentials(&self) -> Result<(&str, &str)> {
        let url = self.ckan_url.as_deref().with_context(|| {
            format!(
                "No catalog URL configured. Set ckan_url in the config file or {}.",
                env_keys::CKAN_URL
            )
        })?;
        let key = self.api_key.as_deref().with_context(|| {
            format!(
                "No API key configured. Set api_key in the config file or {}.",
                env_keys::API_KEY
            )
        })?;
        Ok((url, key))
    }

    /// API key with all but the last four characters hidden
    pub fn masked_api_key(&self) -> Option<String> {
        self.api_key.as_deref().map(|key| {
            let chars: Vec<char> = key.chars().collect();
            if chars.len() <= 4 {
                "*".repeat(chars.len())
            } else {
                let visible: String = chars[chars.len() - 4..].iter().collect();
                format!("{}{}", "*".repeat(chars.len() - 4), visible)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.inputs_url, DEFAULT_INPUTS_URL);
        assert!(config.user_agent.starts_with("ourairports-cli/"));
        assert_eq!(config.build, BuildOptions::default());
        assert!(config.catalog_credentials().is_err());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = Config::parse_file(
            r#"
            ckan_url = "https://data.example.org"
            api_key = "secret-key"
            group_key = "name"
            crowdsourced_tag = false
            resource_format = "by-content"
            "#,
        )
        .unwrap();

        let mut config = Config::default();
        config.apply_file(file);

        assert_eq!(
            config.catalog_credentials().unwrap(),
            ("https://data.example.org", "secret-key")
        );
        assert_eq!(config.build.group_key, GroupKey::Name);
        assert!(!config.build.crowdsourced_tag);
        assert_eq!(config.build.resource_format, ResourceFormat::ByContent);
        assert_eq!(config.inputs_url, DEFAULT_INPUTS_URL);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(Config::parse_file("ckanurl = \"x\"").is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::default();
        config.apply_file(FileConfig {
            ckan_url: Some("https://file.example.org".into()),
            api_key: Some("file-key".into()),
            ..Default::default()
        });

        let env: HashMap<&str, &str> = HashMap::from([
            (env_keys::CKAN_URL, "https://env.example.org"),
            (env_keys::API_KEY, "  "),
            (env_keys::USER_AGENT, "HDX-Developer-2015"),
        ]);
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.ckan_url.as_deref(), Some("https://env.example.org"));
        assert_eq!(config.api_key.as_deref(), Some("file-key"));
        assert_eq!(config.user_agent, "HDX-Developer-2015");
    }

    #[test]
    fn test_masked_api_key() {
        let mut config = Config::default();
        assert_eq!(config.masked_api_key(), None);
        config.api_key = Some("abcd1234".into());
        assert_eq!(config.masked_api_key().as_deref(), Some("****1234"));
        config.api_key = Some("abc".into());
        assert_eq!(config.masked_api_key().as_deref(), Some("***"));
    }

    #[test]
    fn test_explicit_missing_config_file_is_an_error() {
        let err = Config::load(Some(Path::new("/no/such/ourairports.toml"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
