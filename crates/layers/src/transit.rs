use formats::{TransitCollection, TransitGeometry, flatten_degrees, segments};
use foundation::math::positions_from_degrees_array;
use scene::{Scene, SceneError};
use tracing::{debug, trace};

use crate::layer::{Layer, LayerId};
use crate::symbology::CorridorStyle;

/// Metro lines drawn as extruded corridors, one entity per line segment.
#[derive(Debug, Clone)]
pub struct TransitLayer {
    id: LayerId,
    collection: TransitCollection,
    style: CorridorStyle,
}

impl TransitLayer {
    pub fn new(id: u64, collection: TransitCollection) -> Self {
        Self {
            id: LayerId(id),
            collection,
            style: CorridorStyle::default(),
        }
    }
}

impl Layer for TransitLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn populate(&self, scene: &mut Scene) -> Result<usize, SceneError> {
        let mut added = 0;
        for feature in &self.collection.features {
            if let TransitGeometry::Unsupported { kind } = &feature.geometry {
                trace!(kind = %kind, "skipping non-line transit feature");
                continue;
            }
            for segment in segments(&feature.geometry) {
                let positions = positions_from_degrees_array(&flatten_degrees(segment));
                scene.add_corridor(feature.display_name(), self.style.corridor(positions))?;
                added += 1;
            }
        }
        debug!(
            layer = self.id.0,
            features = self.collection.features.len(),
            corridors = added,
            "transit layer populated"
        );
        Ok(added)
    }
}
