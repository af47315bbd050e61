//! Parameter file loader.
//!
//! The file is YAML, read from disk or fetched over HTTP(S):
//!
//! ```yaml
//! ranges:
//!     x: [-284221, -277648]
//!     y: [5987515, 5992714]
//! buffer_value: 200
//! csv:
//!     file: "game_QA.csv"
//!     sep: ";"
//! nb_questions: 5
//! ```
//!
//! Every key is required.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::PathBuf;

use crate::api::http::build_client;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Ranges {
    pub x: [f64; 2],
    pub y: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CsvSource {
    pub sep: String,
    pub file: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ParamsFile {
    ranges: Ranges,
    buffer_value: f64,
    nb_questions: u32,
    csv: CsvSource,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    pub ranges: Ranges,
    pub buffer_value: f64,
    pub nb_questions: u32,
    pub csv_sep: String,
    pub csv_file: PathBuf,
}

impl From<ParamsFile> for Params {
    fn from(file: ParamsFile) -> Self {
        Self {
            ranges: file.ranges,
            buffer_value: file.buffer_value,
            nb_questions: file.nb_questions,
            csv_sep: file.csv.sep,
            csv_file: file.csv.file,
        }
    }
}

impl Params {
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let file: ParamsFile =
            serde_yaml::from_str(contents).context("Failed to parse parameter file")?;
        Ok(file.into())
    }
}

fn is_remote(source: &str) -> bool {
    let lower = source.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Load parameters from a local path or an `http(s)://` URL.
pub fn load_params(source: &str) -> Result<Params> {
    let contents = if is_remote(source) {
        fetch_remote(source)?
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("Failed to read parameter file: {}", source))?
    };

    Params::from_yaml(&contents).with_context(|| format!("Invalid parameter file: {}", source))
}

fn fetch_remote(url: &str) -> Result<String> {
    let client = build_client(None)?;

    let response = client
        .get(url)
        .send()
        .with_context(|| format!("Failed to fetch parameter file: {}", url))?;

    if !response.status().is_success() {
        bail!("Parameter file request returned error status: {}", response.status());
    }

    response
        .text()
        .with_context(|| format!("Failed to read parameter file body: {}", url))
}
