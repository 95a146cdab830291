use std::fmt;

use formats::{
    ArchiveError, DecodeError, Epsg, FeatureCollection, ReprojectError, ShapefileComponentSet,
    UploadedArchive, decode, decode_shp_only, reproject_features, resolve_geojson_hint,
    resolve_prj_hint,
};
use layers::LayerManager;
use runtime::{Event, EventBus};
use scene::{LayerId, MapConfig, MapModel};
use tracing::{info, warn};

/// Status text once an upload has produced a visible layer.
pub const STATUS_LOADED: &str = "Shapefile loaded successfully";

/// Status text after `clear` removes the active layer.
pub const STATUS_READY: &str = "Ready";

/// Why an upload was rejected. The variants carry the technical cause for
/// logs; `user_message` maps each to the dialog text the viewer shows.
#[derive(Debug)]
pub enum UploadError {
    Archive(ArchiveError),
    Decode(DecodeError),
    EmptyFeatureSet,
    Reproject(ReprojectError),
    ExtentComputationFailed,
}

impl UploadError {
    /// Text for the blocking error dialog. Deliberately coarse: archive
    /// shape problems get specific messages, everything else collapses
    /// into a generic processing error.
    pub fn user_message(&self) -> &'static str {
        match self {
            UploadError::Archive(ArchiveError::MissingShp)
            | UploadError::Archive(ArchiveError::AmbiguousShp) => {
                "The ZIP file must contain exactly one .shp file."
            }
            UploadError::Archive(ArchiveError::MissingDbf) => {
                "The ZIP file must contain at least one .dbf file."
            }
            UploadError::EmptyFeatureSet => "The shapefile contains no valid features.",
            UploadError::ExtentComputationFailed => {
                "Failed to calculate the extent of the shapefile. Check the CRS."
            }
            UploadError::Archive(_) | UploadError::Decode(_) | UploadError::Reproject(_) => {
                "An error occurred while processing the shapefile."
            }
        }
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Archive(err) => write!(f, "archive: {err}"),
            UploadError::Decode(err) => write!(f, "decode: {err}"),
            UploadError::EmptyFeatureSet => write!(f, "shapefile contains no valid features"),
            UploadError::Reproject(err) => write!(f, "reproject: {err}"),
            UploadError::ExtentComputationFailed => {
                write!(f, "feature extent is empty or unbounded")
            }
        }
    }
}

impl std::error::Error for UploadError {}

/// What a successful upload produced.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadSummary {
    pub layer_id: LayerId,
    pub feature_count: usize,
    pub projection: Epsg,
    /// blake3 hash of the raw upload, present for the archive path only.
    pub source_hash: Option<String>,
}

#[derive(Debug)]
pub enum UploadResponse {
    Completed(UploadSummary),
    Failed(UploadError),
    /// Rejected without touching the map: another upload is in flight.
    Busy,
}

/// Drives the whole ingestion pipeline for one upload at a time.
///
/// Every failure path emits exactly one error event on the bus and leaves
/// the map untouched; the `in_flight` flag rejects reentrant uploads
/// instead of queueing them.
#[derive(Debug, Default)]
pub struct UploadController {
    bus: EventBus,
    manager: LayerManager,
    config: MapConfig,
    in_flight: bool,
}

impl UploadController {
    pub fn new(config: MapConfig) -> Self {
        Self {
            bus: EventBus::new(),
            manager: LayerManager::new(),
            config,
            in_flight: false,
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn manager(&self) -> &LayerManager {
        &self.manager
    }

    pub fn events(&self) -> &[Event] {
        self.bus.events()
    }

    pub fn last_status(&self) -> Option<&str> {
        self.bus.last_status()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.bus.last_error()
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.bus.drain()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    /// Entry point for a selected file. `.zip` uploads go through archive
    /// inspection; anything else is treated as a bare `.shp` payload.
    pub fn handle_upload(
        &mut self,
        file_name: &str,
        bytes: &[u8],
        map: &mut MapModel,
    ) -> UploadResponse {
        if self.in_flight {
            warn!(file_name, "upload rejected, another one is in flight");
            self.bus.set_status("Upload already in progress");
            return UploadResponse::Busy;
        }
        self.in_flight = true;
        let result = self.run_pipeline(file_name, bytes, map);
        self.in_flight = false;

        match result {
            Ok(summary) => {
                info!(
                    file_name,
                    feature_count = summary.feature_count,
                    projection = %summary.projection,
                    "upload complete"
                );
                self.bus.set_status(STATUS_LOADED);
                UploadResponse::Completed(summary)
            }
            Err(err) => {
                warn!(file_name, error = %err, "upload failed");
                self.bus.show_error(err.user_message());
                UploadResponse::Failed(err)
            }
        }
    }

    /// Flips the uploaded layer's visibility; `None` when there is none.
    pub fn toggle_layer(&mut self) -> Option<bool> {
        self.manager.toggle_visibility()
    }

    /// Removes the uploaded layer, resets the camera and the status text.
    /// No-op (and no event) when nothing is loaded.
    pub fn clear(&mut self, map: &mut MapModel) -> bool {
        if self.manager.clear(map, &self.config) {
            self.bus.set_status(STATUS_READY);
            true
        } else {
            false
        }
    }

    fn run_pipeline(
        &mut self,
        file_name: &str,
        bytes: &[u8],
        map: &mut MapModel,
    ) -> Result<UploadSummary, UploadError> {
        if has_suffix(file_name, ".zip") {
            self.ingest_archive(bytes, map)
        } else {
            self.ingest_bare_shp(bytes, map)
        }
    }

    fn ingest_archive(
        &mut self,
        bytes: &[u8],
        map: &mut MapModel,
    ) -> Result<UploadSummary, UploadError> {
        let archive = UploadedArchive::from_zip_bytes(bytes).map_err(UploadError::Archive)?;
        let set = ShapefileComponentSet::classify(&archive);
        set.validate().map_err(UploadError::Archive)?;

        // validate() guarantees the shp and dbf names resolve.
        let shp = set
            .shp_name()
            .and_then(|name| archive.member_bytes(name))
            .ok_or(UploadError::Archive(ArchiveError::MissingShp))?;
        let dbf = set
            .dbf_name()
            .and_then(|name| archive.member_bytes(name))
            .ok_or(UploadError::Archive(ArchiveError::MissingDbf))?;

        let prj_text = set.prj_name().and_then(|name| archive.member_text(name));
        let projection = resolve_prj_hint(prj_text.as_deref());
        if prj_text.is_none() {
            info!("no .prj member found, defaulting to {projection}");
        }

        let collection = decode(shp, dbf).map_err(UploadError::Decode)?;
        let hash = archive.content_hash().to_string();
        self.finish(collection, projection, Some(hash), map)
    }

    fn ingest_bare_shp(
        &mut self,
        bytes: &[u8],
        map: &mut MapModel,
    ) -> Result<UploadSummary, UploadError> {
        let collection = decode_shp_only(bytes).map_err(UploadError::Decode)?;
        let projection = resolve_geojson_hint(collection.crs_name.as_deref());
        self.finish(collection, projection, None, map)
    }

    fn finish(
        &mut self,
        collection: FeatureCollection,
        projection: Epsg,
        source_hash: Option<String>,
        map: &mut MapModel,
    ) -> Result<UploadSummary, UploadError> {
        if collection.is_empty() {
            return Err(UploadError::EmptyFeatureSet);
        }
        let features =
            reproject_features(&collection, projection).map_err(UploadError::Reproject)?;
        let feature_count = features.len();
        let layer_id = self
            .manager
            .ingest(map, features, source_hash.clone())
            .map_err(|_| UploadError::ExtentComputationFailed)?;
        Ok(UploadSummary {
            layer_id,
            feature_count,
            projection,
            source_hash,
        })
    }
}

fn has_suffix(name: &str, suffix: &str) -> bool {
    let name = name.as_bytes();
    let suffix = suffix.as_bytes();
    name.len() >= suffix.len() && name[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

#[cfg(test)]
mod tests {
    use super::{UploadController, UploadResponse};
    use runtime::Severity;
    use scene::{MapConfig, MapModel};

    #[test]
    fn busy_controller_rejects_without_touching_the_map() {
        let config = MapConfig::default();
        let mut map = MapModel::new(&config);
        let mut controller = UploadController::new(config);
        controller.in_flight = true;

        let response = controller.handle_upload("parcels.zip", b"irrelevant", &mut map);
        assert!(matches!(response, UploadResponse::Busy));
        assert!(controller.is_busy());
        assert_eq!(map.layers().len(), 1);

        let events = controller.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].severity, Severity::Status);
        assert_eq!(events[0].message, "Upload already in progress");
    }

    #[test]
    fn zip_suffix_check_ignores_case() {
        assert!(super::has_suffix("Parcels.ZIP", ".zip"));
        assert!(!super::has_suffix("parcels.shp", ".zip"));
        assert!(!super::has_suffix("zip", ".zip"));
    }
}
