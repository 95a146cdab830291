use std::fmt;

use foundation::Extent;
use scene::{FIT_DURATION_MS, LayerId, LayerKind, MapConfig, MapFeature, MapModel};

use crate::layer::UploadedLayer;

/// A degenerate feature extent after reprojection. Primary signal of a
/// mismatch between the declared source CRS and the actual coordinates.
#[derive(Debug)]
pub enum IngestError {
    ExtentComputationFailed,
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::ExtentComputationFailed => {
                write!(f, "feature extent is empty or unbounded")
            }
        }
    }
}

impl std::error::Error for IngestError {}

/// Owns the single uploaded layer.
///
/// `ingest` and `clear` are the only mutators of the active-layer slot, so
/// no stale layer reference can survive a removal. The extent is validated
/// before the map is touched: a failed ingest leaves the layer set and the
/// camera exactly as they were.
#[derive(Debug, Default)]
pub struct LayerManager {
    active: Option<UploadedLayer>,
}

impl LayerManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&UploadedLayer> {
        self.active.as_ref()
    }

    pub fn ingest(
        &mut self,
        map: &mut MapModel,
        features: Vec<MapFeature>,
        source_hash: Option<String>,
    ) -> Result<LayerId, IngestError> {
        let mut extent = Extent::empty();
        for feature in &features {
            feature.geometry.extend_extent(&mut extent);
        }
        if extent.is_degenerate() {
            return Err(IngestError::ExtentComputationFailed);
        }

        if let Some(previous) = self.active.take() {
            map.detach_layer(previous.id());
        }
        let id = map.attach_layer(LayerKind::Vector);
        map.view_mut().fit(&extent, FIT_DURATION_MS);
        self.active = Some(UploadedLayer::new(id, features, extent, source_hash));
        Ok(id)
    }

    /// Flips the active layer's visibility; returns the new state, or
    /// `None` when there is no layer to toggle.
    pub fn toggle_visibility(&mut self) -> Option<bool> {
        let layer = self.active.as_mut()?;
        let visible = !layer.is_visible();
        layer.set_visible(visible);
        Some(visible)
    }

    /// Removes the active layer and resets the camera. Returns `false`
    /// (and does nothing) when no layer is active, so calling it twice in
    /// a row is a no-op the second time.
    pub fn clear(&mut self, map: &mut MapModel, config: &MapConfig) -> bool {
        let Some(layer) = self.active.take() else {
            return false;
        };
        map.detach_layer(layer.id());
        map.view_mut().reset(config);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{IngestError, LayerManager};
    use scene::{MapConfig, MapFeature, MapGeometry, MapModel};

    fn point_features(points: &[[f64; 2]]) -> Vec<MapFeature> {
        points
            .iter()
            .map(|p| MapFeature::new(MapGeometry::Point(*p)))
            .collect()
    }

    #[test]
    fn ingest_attaches_one_visible_layer_and_fits_camera() {
        let config = MapConfig::default();
        let mut map = MapModel::new(&config);
        let mut manager = LayerManager::new();

        let id = manager
            .ingest(
                &mut map,
                point_features(&[[0.0, 0.0], [100.0, 50.0], [200.0, 100.0]]),
                None,
            )
            .expect("ingest features");

        assert_eq!(map.layers().len(), 2);
        assert!(map.layer_ids().contains(&id));
        let layer = manager.active().expect("active layer");
        assert!(layer.is_visible());
        assert_eq!(layer.feature_count(), 3);

        let center = map.view().center();
        assert!(layer.extent().contains(center[0], center[1]));
    }

    #[test]
    fn ingest_replaces_the_previous_layer() {
        let config = MapConfig::default();
        let mut map = MapModel::new(&config);
        let mut manager = LayerManager::new();

        let first = manager
            .ingest(&mut map, point_features(&[[0.0, 0.0], [1.0, 1.0]]), None)
            .expect("first ingest");
        let second = manager
            .ingest(&mut map, point_features(&[[5.0, 5.0], [6.0, 6.0]]), None)
            .expect("second ingest");

        assert_ne!(first, second);
        // Basemap plus exactly one uploaded layer; the first is gone.
        assert_eq!(map.layers().len(), 2);
        assert!(!map.layer_ids().contains(&first));
        assert!(map.layer_ids().contains(&second));
    }

    #[test]
    fn degenerate_extent_leaves_map_and_camera_untouched() {
        let config = MapConfig::default();
        let mut map = MapModel::new(&config);
        let mut manager = LayerManager::new();

        let layers_before = map.layer_ids();
        let center_before = map.view().center();

        let err = manager
            .ingest(
                &mut map,
                point_features(&[[0.0, 0.0], [f64::NAN, 10.0]]),
                None,
            )
            .expect_err("expect extent failure");
        assert!(matches!(err, IngestError::ExtentComputationFailed));

        assert!(manager.active().is_none());
        assert_eq!(map.layer_ids(), layers_before);
        assert_eq!(map.view().center(), center_before);
        assert!(map.view().animation().is_none());
    }

    #[test]
    fn empty_feature_list_is_a_degenerate_extent() {
        let mut map = MapModel::new(&MapConfig::default());
        let mut manager = LayerManager::new();
        assert!(manager.ingest(&mut map, Vec::new(), None).is_err());
    }

    #[test]
    fn toggle_visibility_flips_and_noops_without_layer() {
        let mut map = MapModel::new(&MapConfig::default());
        let mut manager = LayerManager::new();
        assert_eq!(manager.toggle_visibility(), None);

        manager
            .ingest(&mut map, point_features(&[[0.0, 0.0], [1.0, 1.0]]), None)
            .expect("ingest");
        assert_eq!(manager.toggle_visibility(), Some(false));
        assert_eq!(manager.toggle_visibility(), Some(true));
    }

    #[test]
    fn clear_twice_is_a_noop_the_second_time() {
        let config = MapConfig::default();
        let mut map = MapModel::new(&config);
        let mut manager = LayerManager::new();

        manager
            .ingest(&mut map, point_features(&[[0.0, 0.0], [1.0, 1.0]]), None)
            .expect("ingest");

        assert!(manager.clear(&mut map, &config));
        assert_eq!(map.layers().len(), 1);
        assert_eq!(map.view().center(), config.center);
        assert_eq!(map.view().zoom(), config.zoom);

        let layers_after_first = map.layer_ids();
        assert!(!manager.clear(&mut map, &config));
        assert_eq!(map.layer_ids(), layers_after_first);
    }

    #[test]
    fn ingests_reprojected_wgs84_points() {
        use formats::{EPSG_WGS84, Feature, FeatureCollection, GeoPoint, SourceGeometry};

        let fc = FeatureCollection {
            features: vec![Feature {
                id: None,
                properties: serde_json::Map::new(),
                geometry: SourceGeometry::LineString(vec![
                    GeoPoint::new(-106.3, 35.9),
                    GeoPoint::new(-105.9, 36.1),
                ]),
            }],
            crs_name: None,
        };
        let features = formats::reproject_features(&fc, EPSG_WGS84).expect("reproject");

        let config = MapConfig::default();
        let mut map = MapModel::new(&config);
        let mut manager = LayerManager::new();
        manager.ingest(&mut map, features, None).expect("ingest");

        let center = map.view().center();
        let extent = manager.active().unwrap().extent();
        assert!(extent.contains(center[0], center[1]));
        // Somewhere over New Mexico in Web Mercator meters.
        assert!(center[0] < -11_000_000.0 && center[0] > -12_500_000.0);
        assert!(center[1] > 4_000_000.0 && center[1] < 4_600_000.0);
    }
}
