use crate::components::{BoundingVolume, TileStyle};

/// A streamed 3D tileset attached to the scene's primitive collection.
#[derive(Debug, Clone, PartialEq)]
pub struct TilesetPrimitive {
    pub asset_id: u64,
    /// Root tileset document URL, as resolved by the tile service.
    pub url: String,
    pub root_volume: BoundingVolume,
    /// Tiles described by the root document (children included).
    pub tile_count: usize,
    /// `None` renders tile content with its own colors.
    pub style: Option<TileStyle>,
    pub show: bool,
    /// Draw the root bounding volume as a wireframe, tinted by the style.
    pub debug_show_bounding_volume: bool,
}

impl TilesetPrimitive {
    pub fn new(asset_id: u64, url: String, root_volume: BoundingVolume, tile_count: usize) -> Self {
        Self {
            asset_id,
            url,
            root_volume,
            tile_count,
            style: None,
            show: true,
            debug_show_bounding_volume: false,
        }
    }
}
