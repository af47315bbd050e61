use anyhow::{Context, Result, bail};
use serde_json::Value;

use super::http::{FetchOutcome, RequestOptions, fetch_json};
use crate::config::WikidataConfig;
use crate::error::lookup_str;

pub fn entity_url(template: &str, id: &str) -> String {
    template.replace("{}", id)
}

/// `entities.{id}.sitelinks.{wiki}.url` from an entity document.
pub fn sitelink_url(entity: &Value, id: &str, wiki: &str) -> Result<String> {
    let url = lookup_str(entity, &["entities", id, "sitelinks", wiki, "url"])
        .with_context(|| format!("No {} sitelink for {}", wiki, id))?;
    Ok(url.to_string())
}

/// Look up the Wikipedia URL of a Wikidata item.
///
/// A missing or blank identifier returns `Ok(None)` without any request.
/// An entity without the requested sitelink is an error.
pub fn wiki_url(id: Option<&str>, config: &WikidataConfig) -> Result<Option<String>> {
    let id = match id.map(str::trim) {
        Some(id) if !id.is_empty() => id,
        _ => return Ok(None),
    };

    let url = entity_url(&config.base_url, id);
    let options = RequestOptions::json_api().with_status_codes(vec![200]);

    let entity = match fetch_json(&url, &[], &options)? {
        FetchOutcome::Json(entity) => entity,
        FetchOutcome::Rejected(status) => {
            bail!("Wikidata returned error status {} for {}", status, id)
        }
    };

    sitelink_url(&entity, id, &config.wiki).map(Some)
}
