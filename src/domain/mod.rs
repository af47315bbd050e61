pub mod bbox;
pub mod table;

pub use bbox::{BoundingBox, Tag};
pub use table::{Crs, FeatureRow, FeatureTable};
