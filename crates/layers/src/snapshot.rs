use earcutr::earcut;
use scene::MapGeometry;

use crate::layer::UploadedLayer;

/// Flat render primitives for the active layer, in display coordinates.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LayerSnapshot {
    pub points: Vec<[f64; 2]>,
    pub lines: Vec<Vec<[f64; 2]>>,
    // Flat triangle list (3 vertices per triangle).
    pub area_triangles: Vec<[f64; 2]>,
}

impl UploadedLayer {
    pub fn snapshot(&self) -> LayerSnapshot {
        let mut out = LayerSnapshot::default();
        for feature in self.features() {
            match &feature.geometry {
                MapGeometry::Point(p) => out.points.push(*p),
                MapGeometry::Line(points) => out.lines.push(points.clone()),
                MapGeometry::Area(rings) => {
                    out.area_triangles.extend(triangulate_rings(rings));
                }
            }
        }
        out
    }
}

fn triangulate_rings(rings: &[Vec<[f64; 2]>]) -> Vec<[f64; 2]> {
    // Flatten rings into earcut's packed 2D layout, recording where each
    // hole starts. Closing duplicate points are dropped first.
    let mut vertices: Vec<[f64; 2]> = Vec::new();
    let mut coords: Vec<f64> = Vec::new();
    let mut hole_indices: Vec<usize> = Vec::new();

    for (ring_index, ring) in rings.iter().enumerate() {
        let mut points = ring.clone();
        drop_closing_duplicate(&mut points);
        if points.len() < 3 {
            continue;
        }

        if ring_index > 0 {
            hole_indices.push(vertices.len());
        }
        for p in points {
            coords.push(p[0]);
            coords.push(p[1]);
            vertices.push(p);
        }
    }

    if vertices.len() < 3 {
        return Vec::new();
    }

    let indices = match earcut(&coords, &hole_indices, 2) {
        Ok(indices) => indices,
        Err(_) => return Vec::new(),
    };

    indices
        .into_iter()
        .filter_map(|index| vertices.get(index).copied())
        .collect()
}

fn drop_closing_duplicate(points: &mut Vec<[f64; 2]>) {
    if points.len() >= 2 {
        let first = points[0];
        let last = points[points.len() - 1];
        if (first[0] - last[0]).abs() < 1e-9 && (first[1] - last[1]).abs() < 1e-9 {
            points.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::triangulate_rings;
    use crate::layer::UploadedLayer;
    use foundation::Extent;
    use scene::{LayerId, MapFeature, MapGeometry};

    #[test]
    fn triangle_ring_yields_one_triangle() {
        let rings = vec![vec![[0.0, 0.0], [4.0, 0.0], [2.0, 3.0], [0.0, 0.0]]];
        let triangles = triangulate_rings(&rings);
        assert_eq!(triangles.len(), 3);
    }

    #[test]
    fn square_with_hole_triangulates() {
        let rings = vec![
            vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
            vec![[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0], [4.0, 4.0]],
        ];
        let triangles = triangulate_rings(&rings);
        assert!(!triangles.is_empty());
        assert_eq!(triangles.len() % 3, 0);
        // The hole's center must not be covered; sampling the vertex list is
        // enough to know the hole ring participated.
        assert!(triangles.iter().any(|p| p[0] >= 4.0 && p[0] <= 6.0));
    }

    #[test]
    fn short_rings_produce_nothing() {
        assert!(triangulate_rings(&[vec![[0.0, 0.0], [1.0, 1.0]]]).is_empty());
        assert!(triangulate_rings(&[]).is_empty());
    }

    #[test]
    fn snapshot_splits_primitives_by_kind() {
        let features = vec![
            MapFeature::new(MapGeometry::Point([1.0, 2.0])),
            MapFeature::new(MapGeometry::Line(vec![[0.0, 0.0], [1.0, 0.0]])),
            MapFeature::new(MapGeometry::Area(vec![vec![
                [0.0, 0.0],
                [2.0, 0.0],
                [1.0, 2.0],
                [0.0, 0.0],
            ]])),
        ];
        let mut extent = Extent::empty();
        for f in &features {
            f.geometry.extend_extent(&mut extent);
        }
        let layer = UploadedLayer::new(LayerId(1), features, extent, None);

        let snap = layer.snapshot();
        assert_eq!(snap.points, vec![[1.0, 2.0]]);
        assert_eq!(snap.lines.len(), 1);
        assert_eq!(snap.area_triangles.len(), 3);
    }
}
