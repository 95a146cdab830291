use foundation::Extent;
use serde_json::{Map, Value};

/// Geometry in display coordinates (EPSG:3857 meters).
///
/// Multi-part source geometries are flattened into repeated single
/// geometries during reprojection, so the layer model only ever sees
/// these three kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum MapGeometry {
    Point([f64; 2]),
    Line(Vec<[f64; 2]>),
    Area(Vec<Vec<[f64; 2]>>),
}

impl MapGeometry {
    pub fn extend_extent(&self, extent: &mut Extent) {
        match self {
            MapGeometry::Point(p) => extent.grow(p[0], p[1]),
            MapGeometry::Line(points) => {
                for p in points {
                    extent.grow(p[0], p[1]);
                }
            }
            MapGeometry::Area(rings) => {
                for ring in rings {
                    for p in ring {
                        extent.grow(p[0], p[1]);
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapFeature {
    pub id: Option<String>,
    pub properties: Map<String, Value>,
    pub geometry: MapGeometry,
}

impl MapFeature {
    pub fn new(geometry: MapGeometry) -> Self {
        Self {
            id: None,
            properties: Map::new(),
            geometry,
        }
    }
}
