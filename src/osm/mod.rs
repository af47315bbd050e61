pub mod parser;
pub mod query;

pub use parser::{Element, LatLon, parse_elements};
pub use query::build_query;
