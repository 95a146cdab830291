use std::fmt;

use proj4rs::Proj;
use scene::{MapFeature, MapGeometry};

use crate::feature_set::{Feature, FeatureCollection, GeoPoint, SourceGeometry};
use crate::projection::{EPSG_WEB_MERCATOR, Epsg};

#[derive(Debug)]
pub enum ReprojectError {
    UnsupportedProjection(Epsg),
    Proj(proj4rs::errors::Error),
}

impl fmt::Display for ReprojectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReprojectError::UnsupportedProjection(epsg) => {
                write!(f, "no projection definition for {epsg}")
            }
            ReprojectError::Proj(err) => write!(f, "projection setup error: {err}"),
        }
    }
}

impl std::error::Error for ReprojectError {}

/// Source-CRS to display-CRS coordinate transformer.
///
/// The display projection is fixed (EPSG:3857); only the source side varies
/// per upload. Per-coordinate transform failures surface as non-finite
/// output, which the layer manager later rejects as a degenerate extent.
pub struct Reprojector {
    source: Proj,
    target: Proj,
    geographic_input: bool,
}

impl Reprojector {
    pub fn to_display(source: Epsg) -> Result<Self, ReprojectError> {
        let source_def = source
            .proj_definition()
            .ok_or(ReprojectError::UnsupportedProjection(source))?;
        let target_def = EPSG_WEB_MERCATOR
            .proj_definition()
            .ok_or(ReprojectError::UnsupportedProjection(EPSG_WEB_MERCATOR))?;

        Ok(Self {
            source: Proj::from_proj_string(source_def).map_err(ReprojectError::Proj)?,
            target: Proj::from_proj_string(target_def).map_err(ReprojectError::Proj)?,
            geographic_input: source.is_geographic(),
        })
    }

    pub fn project(&self, point: GeoPoint) -> [f64; 2] {
        let mut coords = if self.geographic_input {
            (point.x.to_radians(), point.y.to_radians(), 0.0)
        } else {
            (point.x, point.y, 0.0)
        };
        match proj4rs::transform::transform(&self.source, &self.target, &mut coords) {
            Ok(()) => [coords.0, coords.1],
            Err(_) => [f64::NAN, f64::NAN],
        }
    }

    fn project_ring(&self, ring: &[GeoPoint]) -> Vec<[f64; 2]> {
        ring.iter().map(|p| self.project(*p)).collect()
    }
}

/// Reprojects a decoded collection into display-space map features.
///
/// Multi-part geometries flatten into repeated single-part features, the
/// same way vector ingest flattens them into per-part scene entities.
pub fn reproject_features(
    collection: &FeatureCollection,
    source: Epsg,
) -> Result<Vec<MapFeature>, ReprojectError> {
    let reprojector = Reprojector::to_display(source)?;

    let mut out = Vec::with_capacity(collection.features.len());
    for feature in &collection.features {
        match &feature.geometry {
            SourceGeometry::Point(p) => {
                out.push(make_feature(feature, MapGeometry::Point(reprojector.project(*p))));
            }
            SourceGeometry::MultiPoint(points) => {
                for p in points {
                    out.push(make_feature(
                        feature,
                        MapGeometry::Point(reprojector.project(*p)),
                    ));
                }
            }
            SourceGeometry::LineString(points) => {
                out.push(make_feature(
                    feature,
                    MapGeometry::Line(reprojector.project_ring(points)),
                ));
            }
            SourceGeometry::MultiLineString(lines) => {
                for line in lines {
                    out.push(make_feature(
                        feature,
                        MapGeometry::Line(reprojector.project_ring(line)),
                    ));
                }
            }
            SourceGeometry::Polygon(rings) => {
                out.push(make_feature(
                    feature,
                    MapGeometry::Area(rings.iter().map(|r| reprojector.project_ring(r)).collect()),
                ));
            }
            SourceGeometry::MultiPolygon(polys) => {
                for rings in polys {
                    out.push(make_feature(
                        feature,
                        MapGeometry::Area(
                            rings.iter().map(|r| reprojector.project_ring(r)).collect(),
                        ),
                    ));
                }
            }
        }
    }

    Ok(out)
}

fn make_feature(source: &Feature, geometry: MapGeometry) -> MapFeature {
    MapFeature {
        id: source.id.clone(),
        properties: source.properties.clone(),
        geometry,
    }
}

#[cfg(test)]
mod tests {
    use super::{Reprojector, reproject_features};
    use crate::feature_set::{Feature, FeatureCollection, GeoPoint, SourceGeometry};
    use crate::projection::{EPSG_WGS84, Epsg};
    use scene::MapGeometry;
    use serde_json::Map;

    fn collection(geometry: SourceGeometry) -> FeatureCollection {
        FeatureCollection {
            features: vec![Feature {
                id: None,
                properties: Map::new(),
                geometry,
            }],
            crs_name: None,
        }
    }

    #[test]
    fn wgs84_origin_maps_to_mercator_origin() {
        let reprojector = Reprojector::to_display(EPSG_WGS84).expect("build reprojector");
        let [x, y] = reprojector.project(GeoPoint::new(0.0, 0.0));
        assert!(x.abs() < 1e-6, "x = {x}");
        assert!(y.abs() < 1e-6, "y = {y}");
    }

    #[test]
    fn wgs84_quarter_turn_maps_to_known_mercator_x() {
        let reprojector = Reprojector::to_display(EPSG_WGS84).expect("build reprojector");
        let [x, _] = reprojector.project(GeoPoint::new(90.0, 0.0));
        // A quarter of the Web Mercator world circumference.
        assert!((x - 10_018_754.17).abs() < 1.0, "x = {x}");
    }

    #[test]
    fn unsupported_source_projection_is_an_error() {
        assert!(Reprojector::to_display(Epsg(2154)).is_err());
    }

    #[test]
    fn multi_geometries_flatten_into_parts() {
        let fc = collection(SourceGeometry::MultiPoint(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(2.0, 2.0),
        ]));
        let features = reproject_features(&fc, EPSG_WGS84).expect("reproject");
        assert_eq!(features.len(), 3);
        assert!(features
            .iter()
            .all(|f| matches!(f.geometry, MapGeometry::Point(_))));
    }

    #[test]
    fn polygon_rings_survive_reprojection() {
        let ring = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(1.0, 0.0),
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(0.0, 0.0),
        ];
        let fc = collection(SourceGeometry::Polygon(vec![ring]));
        let features = reproject_features(&fc, EPSG_WGS84).expect("reproject");
        assert_eq!(features.len(), 1);
        match &features[0].geometry {
            MapGeometry::Area(rings) => {
                assert_eq!(rings.len(), 1);
                assert_eq!(rings[0].len(), 4);
            }
            other => panic!("unexpected geometry: {other:?}"),
        }
    }
}
