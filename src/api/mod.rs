pub mod features;
pub mod http;
pub mod overpass;
pub mod wikidata;

pub use features::fetch_features;
pub use http::{FetchOutcome, RequestOptions};
pub use overpass::fetch_overpass;
pub use wikidata::wiki_url;
