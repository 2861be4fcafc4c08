//! Scene preparation and the two async loads that follow it.
//!
//! Both loads run unordered on the browser event loop. Neither holds a
//! borrow of the viewer across an `.await`; each re-checks that the viewer
//! is still alive before attaching what it fetched.

use std::cell::RefCell;
use std::rc::Rc;

use formats::{TransitCollection, TransitParseError};
use layers::{Layer, TransitLayer, apply_tileset_style};
use scene::Scene;
use scene::components::TerrainProvider;
use scene::primitives::{Graticule, Primitive};
use streaming::{FetchError, ResourceFetcher, StreamingError, TileService};
use tracing::{error, info, warn};

use crate::config::HomeView;
use crate::toggle::VisibilityToggle;
use crate::viewer::Viewer;

const TRANSIT_LAYER_ID: u64 = 1;

#[derive(Debug, thiserror::Error)]
pub enum TransitLoadError {
    #[error("failed to fetch transit geometry from {url}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error(transparent)]
    Parse(#[from] TransitParseError),
}

/// What became of an async load.
#[derive(Debug)]
pub enum LoadOutcome<E> {
    /// Attached, with the number of scene items added.
    Attached(usize),
    /// The viewer was released while loading; the result was dropped.
    Stale,
    Failed(E),
}

/// Synchronous scene setup: home view, globe and the initial visibility state.
pub fn prepare(scene: &mut Scene, home: &HomeView, toggle: &VisibilityToggle) {
    scene.camera_mut().set_view(home.pose());

    let globe = scene.globe_mut();
    globe.terrain = TerrainProvider::Ellipsoid;
    globe.shadows = true;

    if let Err(err) = scene.add_primitive(Primitive::Graticule(Graticule::default())) {
        warn!(error = %err, "graticule not added");
    }

    toggle.enter(scene);
    info!(
        lon = home.lon,
        lat = home.lat,
        height = home.height,
        mode = ?toggle.mode(),
        "scene prepared"
    );
}

pub async fn attach_tileset<S: TileService>(
    viewer: &Rc<RefCell<Viewer>>,
    service: &S,
    asset_id: u64,
) -> LoadOutcome<StreamingError> {
    let loaded = match service.load_tileset(asset_id).await {
        Ok(loaded) => loaded,
        Err(err) => {
            error!(asset_id, error = %err, "failed to load 3D tiles");
            return LoadOutcome::Failed(err);
        }
    };

    let mut viewer = viewer.borrow_mut();
    if viewer.is_destroyed() {
        warn!(asset_id, "viewer released before tileset arrived; dropping it");
        return LoadOutcome::Stale;
    }

    let mode = viewer.mode();
    let show_bounds = viewer.tile_bounds_enabled();
    let mut tileset = loaded.into_primitive();
    apply_tileset_style(&mut tileset, mode);
    tileset.debug_show_bounding_volume = show_bounds;
    let url = tileset.url.clone();
    match viewer
        .scene_mut()
        .add_primitive(Primitive::Tileset(Box::new(tileset)))
    {
        Ok(_) => {
            info!(asset_id, url = %url, mode = ?mode, "tileset attached");
            LoadOutcome::Attached(1)
        }
        Err(err) => {
            warn!(asset_id, error = %err, "tileset dropped");
            LoadOutcome::Stale
        }
    }
}

pub async fn load_transit<F: ResourceFetcher>(
    viewer: &Rc<RefCell<Viewer>>,
    fetcher: &F,
    url: &str,
) -> LoadOutcome<TransitLoadError> {
    let collection = match fetch_transit(fetcher, url).await {
        Ok(collection) => collection,
        Err(err) => {
            error!(url, error = %err, "failed to load transit lines");
            return LoadOutcome::Failed(err);
        }
    };

    let mut viewer = viewer.borrow_mut();
    if viewer.is_destroyed() {
        warn!(url, "viewer released before transit lines arrived; dropping them");
        return LoadOutcome::Stale;
    }

    let layer = TransitLayer::new(TRANSIT_LAYER_ID, collection);
    match layer.populate(viewer.scene_mut()) {
        Ok(added) => {
            info!(url, corridors = added, "transit lines attached");
            LoadOutcome::Attached(added)
        }
        Err(err) => {
            warn!(url, error = %err, "transit lines dropped");
            LoadOutcome::Stale
        }
    }
}

async fn fetch_transit<F: ResourceFetcher>(
    fetcher: &F,
    url: &str,
) -> Result<TransitCollection, TransitLoadError> {
    let payload = fetcher
        .fetch_text(url, None)
        .await
        .map_err(|source| TransitLoadError::Fetch {
            url: url.to_string(),
            source,
        })?;
    Ok(TransitCollection::from_geojson_str(&payload)?)
}

#[cfg(test)]
mod tests {
    use super::{LoadOutcome, TransitLoadError, attach_tileset, load_transit};
    use crate::config::ViewerConfig;
    use crate::viewer::Viewer;
    use foundation::math::Vec3;
    use pretty_assertions::assert_eq;
    use scene::components::{BoundingVolume, TerrainProvider, TileStyle};
    use std::cell::RefCell;
    use std::rc::Rc;
    use streaming::{FetchError, LoadedTileset, ResourceFetcher, StreamingError, TileService};

    struct FixedTiles;

    impl TileService for FixedTiles {
        async fn load_tileset(&self, asset_id: u64) -> Result<LoadedTileset, StreamingError> {
            Ok(LoadedTileset {
                asset_id,
                url: "https://tiles.test/root.json".to_string(),
                root_volume: BoundingVolume::Sphere {
                    center: Vec3::ZERO,
                    radius: 6_400_000.0,
                },
                tile_count: 3,
                attributions: vec![],
            })
        }
    }

    struct BrokenTiles;

    impl TileService for BrokenTiles {
        async fn load_tileset(&self, _asset_id: u64) -> Result<LoadedTileset, StreamingError> {
            Err(StreamingError::MissingUrl)
        }
    }

    struct StaticFetcher(Result<&'static str, FetchError>);

    impl ResourceFetcher for StaticFetcher {
        async fn fetch_text(&self, _url: &str, _bearer: Option<&str>) -> Result<String, FetchError> {
            self.0.clone().map(str::to_string)
        }
    }

    const METRO: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"NOM": "Ligne 1"},
         "geometry": {"type": "LineString", "coordinates": [[4.35, 50.85], [4.36, 50.85]]}},
        {"type": "Feature", "properties": {"NOM": "Ligne 5"},
         "geometry": {"type": "MultiLineString", "coordinates": [
            [[4.33, 50.84], [4.34, 50.84]],
            [[4.37, 50.83], [4.38, 50.83]]]}},
        {"type": "Feature", "properties": {"NOM": "Gare"},
         "geometry": {"type": "Point", "coordinates": [4.33, 50.83]}}
    ]}"#;

    fn viewer() -> Rc<RefCell<Viewer>> {
        Rc::new(RefCell::new(Viewer::new(&ViewerConfig::default())))
    }

    #[test]
    fn prepared_scene_looks_at_brussels() {
        let viewer = viewer();
        let viewer = viewer.borrow();
        let scene = viewer.scene();
        let pose = scene.camera().pose();
        assert!((pose.destination.lon_deg() - 4.3517).abs() < 1e-9);
        assert!((pose.destination.lat_deg() - 50.8503).abs() < 1e-9);
        assert!((scene.camera().height() - 1500.0).abs() < 1e-3);

        let globe = scene.globe();
        assert_eq!(globe.terrain, TerrainProvider::Ellipsoid);
        assert!(globe.shadows);
        assert!(globe.translucency.enabled);
        assert!(globe.depth_test_against_terrain);
        assert!(scene.camera_controller().enable_collision_detection);
        assert_eq!(globe.front_face_alpha(50.0), 1.0);
        assert!(scene.entities().is_empty());
    }

    #[test]
    fn tileset_attaches_with_current_style() {
        let viewer = viewer();
        let outcome = pollster::block_on(attach_tileset(&viewer, &FixedTiles, 2_275_207));
        assert!(matches!(outcome, LoadOutcome::Attached(1)));
        let styles: Vec<_> = viewer
            .borrow()
            .scene()
            .primitives()
            .tilesets()
            .map(|t| t.style.clone())
            .collect();
        assert_eq!(styles, vec![Some(TileStyle::white_tint(1.0))]);
    }

    #[test]
    fn tileset_after_toggle_is_see_through() {
        let viewer = viewer();
        viewer.borrow_mut().press_toggle();
        pollster::block_on(attach_tileset(&viewer, &FixedTiles, 2_275_207));
        let viewer = viewer.borrow();
        let tileset = viewer.scene().primitives().tilesets().next().cloned();
        assert_eq!(
            tileset.and_then(|t| t.style),
            Some(TileStyle::white_tint(0.1))
        );
    }

    #[test]
    fn tile_failure_is_contained() {
        let viewer = viewer();
        let outcome = pollster::block_on(attach_tileset(&viewer, &BrokenTiles, 2_275_207));
        assert!(matches!(outcome, LoadOutcome::Failed(StreamingError::MissingUrl)));
        assert_eq!(viewer.borrow().scene().primitives().tilesets().count(), 0);
    }

    #[test]
    fn transit_lines_land_when_tiles_fail() {
        let viewer = viewer();
        let tiles = pollster::block_on(attach_tileset(&viewer, &BrokenTiles, 2_275_207));
        assert!(matches!(tiles, LoadOutcome::Failed(_)));

        let transit = pollster::block_on(load_transit(
            &viewer,
            &StaticFetcher(Ok(METRO)),
            "/metro.geojson",
        ));
        assert!(matches!(transit, LoadOutcome::Attached(3)));

        let viewer = viewer.borrow();
        assert!(!viewer.is_destroyed());
        assert_eq!(viewer.scene().primitives().tilesets().count(), 0);
        assert_eq!(viewer.scene().entities().len(), 3);
    }

    #[test]
    fn transit_lines_become_corridors() {
        let viewer = viewer();
        let outcome = pollster::block_on(load_transit(
            &viewer,
            &StaticFetcher(Ok(METRO)),
            "/metro.geojson",
        ));
        assert!(matches!(outcome, LoadOutcome::Attached(3)));

        let viewer = viewer.borrow();
        let names: Vec<&str> = viewer
            .scene()
            .entities()
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["Ligne 1", "Ligne 5", "Ligne 5"]);
    }

    #[test]
    fn transit_failures_add_nothing() {
        let viewer = viewer();
        let outcome = pollster::block_on(load_transit(
            &viewer,
            &StaticFetcher(Err(FetchError::NotFound)),
            "/metro.geojson",
        ));
        assert!(matches!(
            outcome,
            LoadOutcome::Failed(TransitLoadError::Fetch { .. })
        ));

        let outcome = pollster::block_on(load_transit(
            &viewer,
            &StaticFetcher(Ok("<html>not found</html>")),
            "/metro.geojson",
        ));
        assert!(matches!(
            outcome,
            LoadOutcome::Failed(TransitLoadError::Parse(_))
        ));
        assert!(viewer.borrow().scene().entities().is_empty());
    }

    #[test]
    fn released_viewer_drops_late_results() {
        let viewer = viewer();
        assert!(viewer.borrow_mut().destroy());

        let tiles = pollster::block_on(attach_tileset(&viewer, &FixedTiles, 2_275_207));
        assert!(matches!(tiles, LoadOutcome::Stale));

        let transit = pollster::block_on(load_transit(
            &viewer,
            &StaticFetcher(Ok(METRO)),
            "/metro.geojson",
        ));
        assert!(matches!(transit, LoadOutcome::Stale));

        let viewer = viewer.borrow();
        assert!(viewer.scene().entities().is_empty());
        assert!(viewer.scene().primitives().is_empty());
    }
}
