use foundation::Extent;
use scene::{LayerId, MapFeature};

/// The uploaded vector overlay.
///
/// Built only after the whole ingestion pipeline has succeeded and owned
/// exclusively by the `LayerManager`; at most one exists at a time.
#[derive(Debug)]
pub struct UploadedLayer {
    id: LayerId,
    features: Vec<MapFeature>,
    extent: Extent,
    visible: bool,
    /// blake3 hash of the upload bytes this layer was built from, when the
    /// upload came through the archive path.
    source_hash: Option<String>,
}

impl UploadedLayer {
    pub fn new(
        id: LayerId,
        features: Vec<MapFeature>,
        extent: Extent,
        source_hash: Option<String>,
    ) -> Self {
        Self {
            id,
            features,
            extent,
            visible: true,
            source_hash,
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn features(&self) -> &[MapFeature] {
        &self.features
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn extent(&self) -> &Extent {
        &self.extent
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn source_hash(&self) -> Option<&str> {
        self.source_hash.as_deref()
    }
}
