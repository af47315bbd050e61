//! geofetch - Fetch OpenStreetMap, GeoJSON and Wikidata data into WGS84 feature tables

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod geometry;
pub mod licenses;
pub mod osm;

pub use api::{fetch_features, fetch_overpass, wiki_url};
pub use domain::{BoundingBox, Crs, FeatureRow, FeatureTable, Tag};
pub use geometry::bbox_from_polygon;
