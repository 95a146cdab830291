use crate::config::MapConfig;
use crate::view::MapView;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LayerId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum LayerKind {
    /// XYZ tile basemap; lives for the whole map lifetime.
    BasemapTile { url_template: String },
    /// Vector overlay built from an uploaded shapefile.
    Vector,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttachedLayer {
    pub id: LayerId,
    pub kind: LayerKind,
}

/// Map state: the ordered set of attached layers plus the camera view.
///
/// Layers are attached and detached only through these methods, so tests
/// can assert that failed uploads leave the layer set unchanged.
#[derive(Debug)]
pub struct MapModel {
    layers: Vec<AttachedLayer>,
    view: MapView,
    next_layer_id: u64,
}

impl MapModel {
    pub fn new(config: &MapConfig) -> Self {
        let mut map = Self {
            layers: Vec::new(),
            view: MapView::new(config.center, config.zoom),
            next_layer_id: 0,
        };
        map.attach_layer(LayerKind::BasemapTile {
            url_template: config.basemap_url.clone(),
        });
        map
    }

    pub fn attach_layer(&mut self, kind: LayerKind) -> LayerId {
        let id = LayerId(self.next_layer_id);
        self.next_layer_id += 1;
        self.layers.push(AttachedLayer { id, kind });
        id
    }

    /// Returns `true` if the layer was attached and has been removed.
    pub fn detach_layer(&mut self, id: LayerId) -> bool {
        let before = self.layers.len();
        self.layers.retain(|layer| layer.id != id);
        self.layers.len() != before
    }

    pub fn layers(&self) -> &[AttachedLayer] {
        &self.layers
    }

    pub fn layer_ids(&self) -> Vec<LayerId> {
        self.layers.iter().map(|layer| layer.id).collect()
    }

    pub fn view(&self) -> &MapView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut MapView {
        &mut self.view
    }
}
