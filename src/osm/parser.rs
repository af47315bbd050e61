use geo::{Geometry, LineString, Point};
use geojson::JsonObject;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{FeatureRow, FeatureTable};

/// A vertex of a way, as returned inline by `out geom`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

/// An Overpass element, decoded only as far as geometry needs.
///
/// Anything that is not a well-formed node or way (relations, areas, nodes
/// without coordinates, ways without inline geometry) is `Other`.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Node { lat: f64, lon: f64 },
    Way { geometry: Vec<LatLon> },
    Other,
}

impl Element {
    pub fn from_value(value: &Value) -> Self {
        match value.get("type").and_then(Value::as_str) {
            Some("node") => {
                let lat = value.get("lat").and_then(Value::as_f64);
                let lon = value.get("lon").and_then(Value::as_f64);
                match (lat, lon) {
                    (Some(lat), Some(lon)) => Element::Node { lat, lon },
                    _ => Element::Other,
                }
            }
            Some("way") => match value.get("geometry") {
                Some(geometry) => match Vec::<LatLon>::deserialize(geometry) {
                    Ok(geometry) => Element::Way { geometry },
                    Err(_) => Element::Other,
                },
                None => Element::Other,
            },
            _ => Element::Other,
        }
    }

    /// Point for a node, line through the vertices for a way.
    ///
    /// A way with fewer than two vertices has no line and yields `None`.
    pub fn geometry(&self) -> Option<Geometry<f64>> {
        match self {
            Element::Node { lat, lon } => Some(Point::new(*lon, *lat).into()),
            Element::Way { geometry } if geometry.len() >= 2 => {
                let line: LineString<f64> = geometry.iter().map(|v| (v.lon, v.lat)).collect();
                Some(line.into())
            }
            _ => None,
        }
    }
}

/// Flatten nested objects into dot-separated keys (`tags.name`,
/// `bounds.minlat`). Arrays and scalars are kept as they are; empty objects
/// produce no key.
pub fn flatten(value: &Value) -> JsonObject {
    let mut out = JsonObject::new();
    if let Value::Object(map) = value {
        flatten_into(&mut out, None, map);
    }
    out
}

fn flatten_into(out: &mut JsonObject, prefix: Option<&str>, map: &JsonObject) {
    for (key, value) in map {
        let path = match prefix {
            Some(prefix) => format!("{}.{}", prefix, key),
            None => key.clone(),
        };
        match value {
            Value::Object(inner) => flatten_into(out, Some(&path), inner),
            _ => {
                out.insert(path, value.clone());
            }
        }
    }
}

/// One table row per element: flattened properties, with the raw `geometry`
/// vertex list replaced by the derived geometry.
pub fn element_row(value: &Value) -> FeatureRow {
    let mut properties = flatten(value);
    properties.shift_remove("geometry");
    FeatureRow::new(Element::from_value(value).geometry(), properties)
}

/// Map an Overpass `elements` list into a feature table, then drop
/// `drop_columns` where present.
pub fn parse_elements<S: AsRef<str>>(elements: &[Value], drop_columns: &[S]) -> FeatureTable {
    let rows = elements.iter().map(element_row).collect();
    let mut table = FeatureTable::from_rows(rows);
    table.drop_columns(drop_columns);
    table
}
