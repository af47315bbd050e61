use anyhow::Result;

use super::http::{FetchOutcome, fetch_json};
use crate::config::OverpassConfig;
use crate::domain::{BoundingBox, FeatureTable, Tag};
use crate::error::lookup_array;
use crate::osm::{build_query, parse_elements};

/// Fetch OSM nodes and ways inside `bbox` that carry any of `tags`.
///
/// The query goes out as the `data` parameter of a GET to `config.url`, with
/// `config.timeout_secs` as the transport timeout. Nodes map to points, ways
/// to lines, anything else keeps a row with no geometry. `config.drop_columns`
/// are removed when present.
///
/// A status outside `config.positive_status_codes` or an empty `elements`
/// list is logged and gives an empty table.
pub fn fetch_overpass(
    bbox: &BoundingBox,
    tags: &[Tag],
    config: &OverpassConfig,
) -> Result<FeatureTable> {
    let query = build_query(bbox, tags);
    log::debug!("Overpass query: {}", query);

    let params = [("data".to_string(), query)];
    let outcome = fetch_json(&config.url, &params, &config.request_options())?;
    let table = table_from_overpass(outcome, &config.drop_columns)?;
    log::info!("Fetched {} OSM elements", table.len());
    Ok(table)
}

/// Convert a fetch outcome holding an Overpass JSON body into a table.
pub fn table_from_overpass<S: AsRef<str>>(
    outcome: FetchOutcome,
    drop_columns: &[S],
) -> Result<FeatureTable> {
    let body = match outcome {
        FetchOutcome::Json(body) => body,
        FetchOutcome::Rejected(status) => {
            log::warn!("Error (status_code): {}", status);
            return Ok(FeatureTable::empty());
        }
    };

    let elements = lookup_array(&body, &["elements"])?;
    if elements.is_empty() {
        log::warn!("Empty response");
        return Ok(FeatureTable::empty());
    }

    Ok(parse_elements(elements, drop_columns))
}
