use geo::Geometry;
use geojson::{Feature, FeatureCollection, JsonObject};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// Coordinate reference system of a feature table.
///
/// Every adapter in this crate produces WGS84 longitude/latitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Crs {
    #[default]
    Wgs84,
}

impl Crs {
    pub fn epsg(&self) -> u32 {
        match self {
            Crs::Wgs84 => 4326,
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

/// A single record: scalar (or nested JSON) properties plus an optional geometry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureRow {
    pub geometry: Option<Geometry<f64>>,
    pub properties: JsonObject,
}

impl FeatureRow {
    pub fn new(geometry: Option<Geometry<f64>>, properties: JsonObject) -> Self {
        Self {
            geometry,
            properties,
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.properties.get(column)
    }
}

/// Ordered rows sharing a sparse property schema.
///
/// `columns` lists property names in first-seen order; the geometry is kept
/// out of it and lives on each row. A table built from an empty response has
/// no rows and no columns but still carries its CRS.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureTable {
    columns: Vec<String>,
    rows: Vec<FeatureRow>,
    crs: Crs,
}

impl FeatureTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<FeatureRow>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for row in &rows {
            for key in row.properties.keys() {
                if seen.insert(key.as_str()) {
                    columns.push(key.clone());
                }
            }
        }

        Self {
            columns,
            rows,
            crs: Crs::Wgs84,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    /// Remove the named columns from the schema and from every row.
    ///
    /// Names that are not present are ignored.
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) {
        let present: Vec<&str> = names
            .iter()
            .map(|n| n.as_ref())
            .filter(|n| self.has_column(n))
            .collect();

        if present.is_empty() {
            return;
        }

        self.columns.retain(|c| !present.contains(&c.as_str()));
        for row in &mut self.rows {
            for name in &present {
                row.properties.shift_remove(*name);
            }
        }
    }

    /// Serialize the table as a GeoJSON FeatureCollection.
    pub fn to_geojson(&self) -> FeatureCollection {
        let features = self
            .rows
            .iter()
            .map(|row| Feature {
                bbox: None,
                geometry: row
                    .geometry
                    .as_ref()
                    .map(|g| geojson::Geometry::new(geojson::Value::from(g))),
                id: None,
                properties: Some(row.properties.clone()),
                foreign_members: None,
            })
            .collect();

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

impl<'a> IntoIterator for &'a FeatureTable {
    type Item = &'a FeatureRow;
    type IntoIter = std::slice::Iter<'a, FeatureRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Point;
    use serde_json::json;

    fn row(props: Value) -> FeatureRow {
        let properties = match props {
            Value::Object(map) => map,
            _ => JsonObject::new(),
        };
        FeatureRow::new(Some(Point::new(2.0, 1.0).into()), properties)
    }

    #[test]
    fn test_empty_table() {
        let table = FeatureTable::empty();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert!(table.columns().is_empty());
        assert_eq!(table.crs().to_string(), "EPSG:4326");
    }

    #[test]
    fn test_columns_are_union_of_rows() {
        let table = FeatureTable::from_rows(vec![
            row(json!({"id": 1, "name": "a"})),
            row(json!({"id": 2, "ref": "b"})),
        ]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.columns(), &["id", "name", "ref"]);
        assert!(table.rows()[1].get("name").is_none());
    }

    #[test]
    fn test_columns_keep_first_seen_order() {
        let table = FeatureTable::from_rows(vec![
            row(json!({"zeta": 1, "alpha": 2})),
            row(json!({"mid": 3, "alpha": 4, "beta": 5})),
        ]);

        assert_eq!(table.columns(), &["zeta", "alpha", "mid", "beta"]);
        let keys: Vec<&String> = table.rows()[1].properties.keys().collect();
        assert_eq!(keys, vec!["mid", "alpha", "beta"]);
    }

    #[test]
    fn test_drop_columns_keeps_remaining_order() {
        let mut table =
            FeatureTable::from_rows(vec![row(json!({"c": 1, "nodes": [], "a": 2, "b": 3}))]);
        table.drop_columns(&["nodes"]);

        assert_eq!(table.columns(), &["c", "a", "b"]);
        let keys: Vec<&String> = table.rows()[0].properties.keys().collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_drop_columns_ignores_missing() {
        let mut table = FeatureTable::from_rows(vec![row(json!({"id": 1, "nodes": [1, 2]}))]);
        let before = table.clone();

        table.drop_columns(&["not_there"]);
        assert_eq!(table, before);

        table.drop_columns(&["nodes", "not_there"]);
        assert_eq!(table.columns(), &["id"]);
        assert!(table.rows()[0].get("nodes").is_none());
    }

    #[test]
    fn test_to_geojson() {
        let table = FeatureTable::from_rows(vec![
            row(json!({"id": 1})),
            FeatureRow::new(None, JsonObject::new()),
        ]);
        let collection = table.to_geojson();

        assert_eq!(collection.features.len(), 2);
        assert!(collection.features[0].geometry.is_some());
        assert!(collection.features[1].geometry.is_none());
    }
}
