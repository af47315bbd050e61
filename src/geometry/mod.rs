pub mod bbox;

pub use bbox::bbox_from_polygon;
