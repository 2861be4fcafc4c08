//! The subset of the 3D Tiles `tileset.json` document the viewer needs.

use foundation::math::Vec3;
use scene::components::BoundingVolume;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum TilesetParseError {
    #[error("invalid tileset JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("root tile has no region, box or sphere bounding volume")]
    MissingBoundingVolume,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TilesetDocument {
    pub asset: TilesetAsset,
    #[serde(default)]
    pub geometric_error: f64,
    pub root: TileNode,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TilesetAsset {
    pub version: String,
    #[serde(default)]
    pub tileset_version: Option<String>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub enum Refine {
    #[serde(rename = "ADD", alias = "add")]
    Add,
    #[serde(rename = "REPLACE", alias = "replace")]
    Replace,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileNode {
    pub bounding_volume: BoundingVolumeJson,
    #[serde(default)]
    pub geometric_error: f64,
    #[serde(default)]
    pub refine: Option<Refine>,
    #[serde(default)]
    pub content: Option<TileContent>,
    #[serde(default)]
    pub children: Vec<TileNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TileContent {
    /// 3D Tiles 1.0 still uses `url`.
    #[serde(alias = "url")]
    pub uri: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoundingVolumeJson {
    #[serde(default)]
    pub region: Option<[f64; 6]>,
    #[serde(default, rename = "box")]
    pub obb: Option<[f64; 12]>,
    #[serde(default)]
    pub sphere: Option<[f64; 4]>,
}

impl BoundingVolumeJson {
    /// Region wins over box, box over sphere.
    pub fn to_bounding_volume(&self) -> Option<BoundingVolume> {
        if let Some([west, south, east, north, min_height, max_height]) = self.region {
            return Some(BoundingVolume::Region {
                west,
                south,
                east,
                north,
                min_height,
                max_height,
            });
        }
        if let Some(b) = self.obb {
            return Some(BoundingVolume::Box {
                center: Vec3::new(b[0], b[1], b[2]),
                half_axes: [
                    Vec3::new(b[3], b[4], b[5]),
                    Vec3::new(b[6], b[7], b[8]),
                    Vec3::new(b[9], b[10], b[11]),
                ],
            });
        }
        self.sphere.map(|[x, y, z, radius]| BoundingVolume::Sphere {
            center: Vec3::new(x, y, z),
            radius,
        })
    }
}

impl TileNode {
    /// This tile plus all of its descendants.
    pub fn tile_count(&self) -> usize {
        1 + self.children.iter().map(TileNode::tile_count).sum::<usize>()
    }
}

impl TilesetDocument {
    pub fn from_json_str(payload: &str) -> Result<Self, TilesetParseError> {
        Ok(serde_json::from_str(payload)?)
    }

    pub fn root_volume(&self) -> Result<BoundingVolume, TilesetParseError> {
        self.root
            .bounding_volume
            .to_bounding_volume()
            .ok_or(TilesetParseError::MissingBoundingVolume)
    }

    pub fn tile_count(&self) -> usize {
        self.root.tile_count()
    }
}

#[cfg(test)]
mod tests {
    use super::{Refine, TilesetDocument, TilesetParseError};
    use scene::components::BoundingVolume;

    const BOX_TILESET: &str = r#"{
        "asset": {"version": "1.0"},
        "geometricError": 1e100,
        "root": {
            "boundingVolume": {"box": [0,0,0, 6378137,0,0, 0,6378137,0, 0,0,6356752]},
            "geometricError": 1e100,
            "refine": "REPLACE",
            "children": [
                {"boundingVolume": {"sphere": [0,0,0,10]}, "geometricError": 1, "content": {"uri": "a.glb"}},
                {"boundingVolume": {"sphere": [0,0,0,10]}, "geometricError": 1,
                 "children": [{"boundingVolume": {"sphere": [0,0,0,1]}, "content": {"url": "b.b3dm"}}]}
            ]
        }
    }"#;

    #[test]
    fn parses_box_root_and_counts_tiles() {
        let doc = TilesetDocument::from_json_str(BOX_TILESET).expect("parse");
        assert_eq!(doc.asset.version, "1.0");
        assert_eq!(doc.root.refine, Some(Refine::Replace));
        assert_eq!(doc.tile_count(), 4);
        let grandchild = &doc.root.children[1].children[0];
        assert_eq!(grandchild.content.as_ref().map(|c| c.uri.as_str()), Some("b.b3dm"));
        match doc.root_volume().expect("volume") {
            BoundingVolume::Box { half_axes, .. } => assert_eq!(half_axes[0].x, 6_378_137.0),
            other => panic!("unexpected volume {other:?}"),
        }
    }

    #[test]
    fn region_is_preferred() {
        let payload = r#"{"asset": {"version": "1.1"}, "root": {"boundingVolume": {
            "region": [0.07, 0.88, 0.08, 0.89, 0, 200],
            "sphere": [0,0,0,1]
        }}}"#;
        let doc = TilesetDocument::from_json_str(payload).expect("parse");
        assert!(matches!(
            doc.root_volume(),
            Ok(BoundingVolume::Region { max_height, .. }) if max_height == 200.0
        ));
    }

    #[test]
    fn missing_volume_is_an_error() {
        let payload = r#"{"asset": {"version": "1.0"}, "root": {"boundingVolume": {}}}"#;
        let doc = TilesetDocument::from_json_str(payload).expect("parse");
        assert!(matches!(
            doc.root_volume(),
            Err(TilesetParseError::MissingBoundingVolume)
        ));
        assert!(matches!(
            TilesetDocument::from_json_str("{}"),
            Err(TilesetParseError::Json(_))
        ));
    }
}
