//! License report for an installed environment.
//!
//! Package metadata comes from the `*.json` files of a conda-style metadata
//! directory, optionally merged with a YAML mapping of extra packages:
//!
//! ```yaml
//! geopandas:
//!     version: "0.14.0"
//!     license: BSD-3-Clause
//!     url: https://pypi.org/project/geopandas/
//! ```

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const COLUMNS: [&str; 5] = ["name", "version", "channel", "license", "url"];

/// Package metadata as found on disk; any field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPackage {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub version: Option<Value>,
    #[serde(default)]
    pub channel: Option<Value>,
    #[serde(default)]
    pub license: Option<Value>,
    #[serde(default)]
    pub url: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseEntry {
    pub name: String,
    pub version: Option<String>,
    pub channel: Option<String>,
    pub license: String,
    pub url: Option<String>,
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}

impl LicenseEntry {
    fn cells(&self) -> [String; 5] {
        let optional = |value: &Option<String>| escape_cell(value.as_deref().unwrap_or_default());
        [
            escape_cell(&self.name),
            optional(&self.version),
            optional(&self.channel),
            escape_cell(&self.license),
            optional(&self.url),
        ]
    }
}

fn cell(value: &Option<Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

impl RawPackage {
    /// `None` when the package has no license field.
    fn into_entry(self) -> Option<LicenseEntry> {
        let license = cell(&self.license)?;
        Some(LicenseEntry {
            name: cell(&self.name).unwrap_or_default(),
            version: cell(&self.version),
            channel: cell(&self.channel),
            license,
            url: cell(&self.url),
        })
    }
}

/// Every `*.json` file directly inside `env_dir`, parsed as package metadata.
pub fn read_package_metadata(env_dir: &Path) -> Result<Vec<RawPackage>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(env_dir)
        .with_context(|| format!("Failed to read environment directory: {:?}", env_dir))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    paths
        .iter()
        .map(|path| {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {:?}", path))?;
            serde_json::from_str(&contents).with_context(|| format!("Failed to parse {:?}", path))
        })
        .collect()
}

/// Extra packages from a YAML mapping of `name -> fields`.
pub fn read_pip_packages(path: &Path) -> Result<Vec<RawPackage>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read pip package list: {:?}", path))?;
    let libs: BTreeMap<String, RawPackage> = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse pip package list: {:?}", path))?;

    Ok(libs
        .into_iter()
        .map(|(name, mut package)| {
            package.name = Some(Value::String(name));
            package
        })
        .collect())
}

/// Merge environment and pip metadata, keep licensed packages, sort by name.
pub fn collect_licenses(env_dir: &Path, pip_libs: Option<&Path>) -> Result<Vec<LicenseEntry>> {
    let mut packages = read_package_metadata(env_dir)?;
    if packages.is_empty() {
        bail!("No package metadata (*.json) found in {:?}", env_dir);
    }

    if let Some(pip_libs) = pip_libs {
        packages.extend(read_pip_packages(pip_libs)?);
    }

    let mut entries: Vec<LicenseEntry> = packages
        .into_iter()
        .filter_map(RawPackage::into_entry)
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(entries)
}

/// Render entries as a pipe table with left-aligned, padded columns.
pub fn to_markdown(entries: &[LicenseEntry]) -> String {
    let rows: Vec<[String; 5]> = entries.iter().map(LicenseEntry::cells).collect();

    let widths: Vec<usize> = COLUMNS
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let render = |cells: &[String]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!(" {:<w$} ", c, w = w))
            .collect();
        format!("|{}|", padded.join("|"))
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    let header: Vec<String> = COLUMNS.iter().map(|c| c.to_string()).collect();
    lines.push(render(header.as_slice()));
    let separator: Vec<String> = widths
        .iter()
        .map(|&w| format!(":{}", "-".repeat(w + 1)))
        .collect();
    lines.push(format!("|{}|", separator.join("|")));
    for row in &rows {
        lines.push(render(row.as_slice()));
    }

    lines.join("\n")
}

/// Collect licenses and write the markdown report. Returns the number of rows.
///
/// An empty `pip_libs` path skips the pip package list.
pub fn write_report(env_dir: &Path, output: &Path, pip_libs: &Path) -> Result<usize> {
    let pip_libs = (!pip_libs.as_os_str().is_empty()).then_some(pip_libs);
    let entries = collect_licenses(env_dir, pip_libs)?;

    std::fs::write(output, to_markdown(&entries))
        .with_context(|| format!("Failed to write report: {:?}", output))?;
    Ok(entries.len())
}
