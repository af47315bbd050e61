use anyhow::{Context, Result};
use geo::Geometry;
use serde_json::Value;

use super::http::{FetchOutcome, RequestOptions, fetch_json};
use crate::domain::{FeatureRow, FeatureTable};
use crate::error::{SchemaError, take_array};

/// Fetch a GeoJSON FeatureCollection from `{base_url}{sub_url}` as a feature table.
///
/// A status outside `options.positive_status_codes` or an empty `features`
/// array is logged and gives an empty table. Only `geometry` and
/// `properties` are read from each feature; either may be null or absent.
pub fn fetch_features(
    base_url: &str,
    sub_url: &str,
    params: &[(String, String)],
    options: &RequestOptions,
) -> Result<FeatureTable> {
    let url = format!("{}{}", base_url, sub_url);
    let outcome = fetch_json(&url, params, options)?;
    let table = table_from_feature_collection(outcome)?;
    log::info!("Fetched {} features from {}", table.len(), url);
    Ok(table)
}

/// Convert a fetch outcome holding a FeatureCollection body into a table.
pub fn table_from_feature_collection(outcome: FetchOutcome) -> Result<FeatureTable> {
    let mut body = match outcome {
        FetchOutcome::Json(body) => body,
        FetchOutcome::Rejected(status) => {
            log::warn!("Error (status_code): {}", status);
            return Ok(FeatureTable::empty());
        }
    };

    let features = take_array(&mut body, "features")?;
    if features.is_empty() {
        log::warn!("Empty response");
        return Ok(FeatureTable::empty());
    }

    let rows = features
        .into_iter()
        .enumerate()
        .map(|(i, feature)| feature_row(feature).with_context(|| format!("Invalid feature #{}", i)))
        .collect::<Result<Vec<_>>>()?;

    Ok(FeatureTable::from_rows(rows))
}

fn feature_row(mut feature: Value) -> Result<FeatureRow> {
    let geometry = match feature.get_mut("geometry").map(Value::take) {
        None | Some(Value::Null) => None,
        Some(value) => {
            let geometry = geojson::Geometry::from_json_value(value)?;
            Some(Geometry::<f64>::try_from(geometry.value)?)
        }
    };

    let properties = match feature.get_mut("properties").map(Value::take) {
        None | Some(Value::Null) => Default::default(),
        Some(Value::Object(properties)) => properties,
        Some(_) => {
            return Err(SchemaError::NotAnObject {
                path: "properties".to_string(),
            }
            .into());
        }
    };

    Ok(FeatureRow::new(geometry, properties))
}
