use crate::domain::{BoundingBox, Tag};

const QUERY_START: &str = "[out:json];(";
const QUERY_END: &str = ");out geom;";

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Overpass QL clause selecting nodes and ways carrying `tag` inside `bbox`.
pub fn tag_clause(tag: &Tag, bbox: &BoundingBox) -> String {
    format!(
        "nw['{}'='{}']({});",
        escape(&tag.key),
        escape(&tag.value),
        bbox
    )
}

/// Build the Overpass QL query for nodes and ways matching any of `tags`.
///
/// Every tag gets its own clause over the same bounding box, all inside one
/// union block, and `out geom` so ways come back with inline vertices:
///
/// ```text
/// [out:json];(nw['k1'='v1'](s,w,n,e);nw['k2'='v2'](s,w,n,e););out geom;
/// ```
///
/// An empty tag list gives an empty union. Duplicate tags are kept.
pub fn build_query(bbox: &BoundingBox, tags: &[Tag]) -> String {
    let clauses: String = tags.iter().map(|tag| tag_clause(tag, bbox)).collect();
    format!("{}{}{}", QUERY_START, clauses, QUERY_END)
}
