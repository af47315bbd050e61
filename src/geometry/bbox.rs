use geo::Polygon;

use crate::domain::BoundingBox;

/// Bounding box of a polygon's exterior ring, ready for an Overpass query.
///
/// Holes are ignored. The polygon is read as (x = lon, y = lat) and the
/// result is returned lat-first: `(min_lat, min_lon, max_lat, max_lon)`.
/// Returns `None` for a polygon with an empty exterior.
pub fn bbox_from_polygon(polygon: &Polygon<f64>) -> Option<BoundingBox> {
    let mut coords = polygon.exterior().coords();
    let first = coords.next()?;

    let mut min_x = first.x;
    let mut max_x = first.x;
    let mut min_y = first.y;
    let mut max_y = first.y;

    for c in coords {
        min_x = min_x.min(c.x);
        max_x = max_x.max(c.x);
        min_y = min_y.min(c.y);
        max_y = max_y.max(c.y);
    }

    Some(BoundingBox::new(min_y, min_x, max_y, max_x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, polygon};

    #[test]
    fn test_bbox_swaps_to_lat_first() {
        let poly = polygon![
            (x: 5.6, y: 45.1),
            (x: 5.9, y: 45.1),
            (x: 5.9, y: 45.3),
            (x: 5.6, y: 45.3),
        ];

        let bbox = bbox_from_polygon(&poly).unwrap();
        assert_eq!(bbox.as_tuple(), (45.1, 5.6, 45.3, 5.9));
    }

    #[test]
    fn test_bbox_ignores_holes() {
        let poly = polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 2.0), (x: 0.0, y: 2.0)],
            interiors: [[(x: 10.0, y: 10.0), (x: 11.0, y: 10.0), (x: 11.0, y: 11.0)]],
        );

        let bbox = bbox_from_polygon(&poly).unwrap();
        assert_eq!(bbox.as_tuple(), (0.0, 0.0, 2.0, 4.0));
    }

    #[test]
    fn test_bbox_is_order_invariant() {
        let points = vec![(2.0, -1.0), (-3.0, 4.0), (7.5, 0.5), (1.0, 9.0)];
        let mut rotated = points.clone();
        rotated.rotate_left(2);
        let mut reversed = points.clone();
        reversed.reverse();

        let expected = bbox_from_polygon(&Polygon::new(LineString::from(points), vec![])).unwrap();
        for variant in [rotated, reversed] {
            let bbox = bbox_from_polygon(&Polygon::new(LineString::from(variant), vec![])).unwrap();
            assert_eq!(bbox, expected);
        }

        assert!(expected.min_lat <= expected.max_lat);
        assert!(expected.min_lon <= expected.max_lon);
        assert_eq!(expected.as_tuple(), (-1.0, -3.0, 9.0, 7.5));
    }

    #[test]
    fn test_bbox_empty_polygon() {
        let poly = Polygon::new(LineString::<f64>::new(vec![]), vec![]);
        assert!(bbox_from_polygon(&poly).is_none());
    }
}
