pub mod params;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::http::RequestOptions;

pub use params::{CsvSource, Params, Ranges, load_params};

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub overpass: OverpassConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub wikidata: WikidataConfig,
}

fn default_overpass_url() -> String {
    "http://overpass-api.de/api/interpreter".to_string()
}

fn default_overpass_timeout_secs() -> u64 {
    25
}

fn default_drop_columns() -> Vec<String> {
    vec!["nodes".to_string()]
}

fn default_overpass_status_codes() -> Vec<u16> {
    vec![200]
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OverpassConfig {
    #[serde(default = "default_overpass_url")]
    pub url: String,
    #[serde(default = "default_overpass_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_drop_columns")]
    pub drop_columns: Vec<String>,
    #[serde(default = "default_overpass_status_codes")]
    pub positive_status_codes: Vec<u16>,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            url: default_overpass_url(),
            timeout_secs: default_overpass_timeout_secs(),
            drop_columns: default_drop_columns(),
            positive_status_codes: default_overpass_status_codes(),
        }
    }
}

impl OverpassConfig {
    pub fn request_options(&self) -> RequestOptions {
        RequestOptions {
            headers: Vec::new(),
            timeout: Some(Duration::from_secs(self.timeout_secs)),
            positive_status_codes: self.positive_status_codes.clone(),
        }
    }
}

fn default_accept() -> String {
    "application/json".to_string()
}

fn default_api_status_codes() -> Vec<u16> {
    vec![200, 206]
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_accept")]
    pub accept: String,
    #[serde(default = "default_api_status_codes")]
    pub positive_status_codes: Vec<u16>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            accept: default_accept(),
            positive_status_codes: default_api_status_codes(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    pub fn request_options(&self) -> RequestOptions {
        RequestOptions {
            headers: vec![("Accept".to_string(), self.accept.clone())],
            timeout: self.timeout_secs.map(Duration::from_secs),
            positive_status_codes: self.positive_status_codes.clone(),
        }
    }
}

fn default_wikidata_base_url() -> String {
    "https://www.wikidata.org/wiki/Special:EntityData/{}.json".to_string()
}

fn default_wiki() -> String {
    "frwiki".to_string()
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct WikidataConfig {
    /// Entity URL template; `{}` is replaced by the identifier.
    #[serde(default = "default_wikidata_base_url")]
    pub base_url: String,
    #[serde(default = "default_wiki")]
    pub wiki: String,
}

impl Default for WikidataConfig {
    fn default() -> Self {
        Self {
            base_url: default_wikidata_base_url(),
            wiki: default_wiki(),
        }
    }
}

impl FileConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// First parseable config file from the usual locations, if any.
    pub fn load() -> Option<Self> {
        for path in get_config_paths() {
            if path.exists() {
                match Self::from_path(&path) {
                    Ok(config) => return Some(config),
                    Err(e) => log::warn!("Skipping config file {:?}: {:#}", path, e),
                }
            }
        }
        None
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("geofetch.toml"));
    paths.push(PathBuf::from(".geofetch.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("geofetch").join("config.toml"));
        paths.push(config_dir.join("geofetch.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".geofetch.toml"));
    }

    paths
}
