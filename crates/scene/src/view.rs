use foundation::Extent;

use crate::config::MapConfig;

/// The map's working projection. Fixed, not configurable.
pub const DISPLAY_PROJECTION: &str = "EPSG:3857";

/// Duration of the extent-fit camera animation.
pub const FIT_DURATION_MS: u32 = 1000;

const WEB_MERCATOR_HALF_WORLD_M: f64 = 20_037_508.342789244;
const TILE_SIZE_PX: f64 = 256.0;
// Nominal viewport used to pick a fitting zoom level.
const VIEWPORT_PX: [f64; 2] = [1024.0, 768.0];
const MIN_ZOOM: f64 = 0.0;
const MAX_ZOOM: f64 = 19.0;

/// Record of the most recent camera move, for the renderer to interpolate.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraMove {
    pub from_center: [f64; 2],
    pub from_zoom: f64,
    pub to_center: [f64; 2],
    pub to_zoom: f64,
    pub duration_ms: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    center: [f64; 2],
    zoom: f64,
    animation: Option<CameraMove>,
}

impl MapView {
    pub fn new(center: [f64; 2], zoom: f64) -> Self {
        Self {
            center,
            zoom,
            animation: None,
        }
    }

    pub fn center(&self) -> [f64; 2] {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn animation(&self) -> Option<&CameraMove> {
        self.animation.as_ref()
    }

    /// Animates the camera so the extent fills the nominal viewport.
    ///
    /// Callers must reject degenerate extents before fitting; a degenerate
    /// extent here leaves the view untouched.
    pub fn fit(&mut self, extent: &Extent, duration_ms: u32) {
        let Some(center) = extent.center() else {
            return;
        };

        let needed_resolution =
            (extent.width() / VIEWPORT_PX[0]).max(extent.height() / VIEWPORT_PX[1]);
        let world_m = 2.0 * WEB_MERCATOR_HALF_WORLD_M;
        // Resolution at zoom z is world / (256 * 2^z) meters per pixel.
        let zoom = if needed_resolution > 0.0 {
            (world_m / (TILE_SIZE_PX * needed_resolution)).log2()
        } else {
            MAX_ZOOM
        };
        let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);

        self.animation = Some(CameraMove {
            from_center: self.center,
            from_zoom: self.zoom,
            to_center: center,
            to_zoom: zoom,
            duration_ms,
        });
        self.center = center;
        self.zoom = zoom;
    }

    /// Jumps to a fixed pose without animating. Used by the clear action.
    pub fn reset(&mut self, config: &MapConfig) {
        self.center = config.center;
        self.zoom = config.zoom;
        self.animation = None;
    }
}
