use formats::TilesetDocument;
use scene::components::{BoundingVolume, TilesetPrimitive};
use tracing::{debug, info};

use crate::error::StreamingError;
use crate::fetch::ResourceFetcher;
use crate::protocol::{AssetEndpoint, endpoint_url};

/// A root tileset document that has been resolved, fetched and parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTileset {
    pub asset_id: u64,
    pub url: String,
    pub root_volume: BoundingVolume,
    pub tile_count: usize,
    pub attributions: Vec<String>,
}

impl LoadedTileset {
    pub fn into_primitive(self) -> TilesetPrimitive {
        TilesetPrimitive::new(self.asset_id, self.url, self.root_volume, self.tile_count)
    }
}

/// Source of streamed 3D tilesets, addressed by asset id.
#[allow(async_fn_in_trait)]
pub trait TileService {
    async fn load_tileset(&self, asset_id: u64) -> Result<LoadedTileset, StreamingError>;
}

/// Asset-id based tile service: endpoint lookup, then the root document.
#[derive(Debug, Clone)]
pub struct IonTileService<F> {
    fetcher: F,
    server: String,
    access_token: String,
}

impl<F: ResourceFetcher> IonTileService<F> {
    pub fn with_server(fetcher: F, server: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            fetcher,
            server: server.into(),
            access_token: access_token.into(),
        }
    }

    async fn get(&self, url: &str, bearer: Option<&str>) -> Result<String, StreamingError> {
        self.fetcher
            .fetch_text(url, bearer)
            .await
            .map_err(|source| StreamingError::Fetch {
                url: url.to_string(),
                source,
            })
    }
}

impl<F: ResourceFetcher> TileService for IonTileService<F> {
    async fn load_tileset(&self, asset_id: u64) -> Result<LoadedTileset, StreamingError> {
        let lookup = endpoint_url(&self.server, asset_id, &self.access_token);
        let endpoint = AssetEndpoint::from_json_str(&self.get(&lookup, None).await?)?;
        let location = endpoint.tileset_location()?;
        debug!(asset_id, url = %location.url, "resolved tileset endpoint");

        let payload = self.get(&location.url, location.bearer.as_deref()).await?;
        let document = TilesetDocument::from_json_str(&payload)?;
        let loaded = LoadedTileset {
            asset_id,
            url: location.url,
            root_volume: document.root_volume()?,
            tile_count: document.tile_count(),
            attributions: endpoint.attributions.into_iter().map(|a| a.html).collect(),
        };
        info!(
            asset_id,
            version = %document.asset.version,
            tiles = loaded.tile_count,
            "tileset root loaded"
        );
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::{IonTileService, TileService};
    use crate::error::StreamingError;
    use crate::fetch::{FetchError, ResourceFetcher};
    use scene::components::BoundingVolume;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapFetcher {
        responses: HashMap<String, String>,
        seen: RefCell<Vec<(String, Option<String>)>>,
    }

    impl MapFetcher {
        fn with(mut self, url: &str, body: &str) -> Self {
            self.responses.insert(url.to_string(), body.to_string());
            self
        }
    }

    impl ResourceFetcher for MapFetcher {
        async fn fetch_text(&self, url: &str, bearer: Option<&str>) -> Result<String, FetchError> {
            self.seen
                .borrow_mut()
                .push((url.to_string(), bearer.map(str::to_string)));
            self.responses.get(url).cloned().ok_or(FetchError::NotFound)
        }
    }

    const ENDPOINT: &str = "https://ion.test/v1/assets/2275207/endpoint?access_token=tok";
    const ROOT: &str = r#"{"asset": {"version": "1.0"}, "geometricError": 1e5,
        "root": {"boundingVolume": {"sphere": [0, 0, 0, 6400000]}, "geometricError": 1e5,
                 "children": [{"boundingVolume": {"sphere": [0, 0, 0, 10]}}]}}"#;

    #[test]
    fn loads_direct_tileset_with_bearer() {
        let fetcher = MapFetcher::default()
            .with(
                ENDPOINT,
                r#"{"type": "3DTILES", "url": "https://assets.test/tileset.json", "accessToken": "asset-tok"}"#,
            )
            .with("https://assets.test/tileset.json", ROOT);
        let service = IonTileService::with_server(&fetcher, "https://ion.test", "tok");

        let loaded = pollster::block_on(service.load_tileset(2_275_207)).expect("load");
        assert_eq!(loaded.tile_count, 2);
        assert!(matches!(loaded.root_volume, BoundingVolume::Sphere { radius, .. } if radius == 6_400_000.0));

        let primitive = loaded.into_primitive();
        assert_eq!(primitive.asset_id, 2_275_207);
        assert!(primitive.show);
        assert!(primitive.style.is_none());

        let seen = fetcher.seen.borrow();
        assert_eq!(seen[0], (ENDPOINT.to_string(), None));
        assert_eq!(seen[1].1.as_deref(), Some("asset-tok"));
    }

    #[test]
    fn loads_external_tileset() {
        let fetcher = MapFetcher::default()
            .with(
                ENDPOINT,
                r#"{"type": "3DTILES", "externalType": "3DTILES",
                    "options": {"url": "https://tiles.test/root.json?key=k"},
                    "attributions": [{"html": "Data provider"}]}"#,
            )
            .with("https://tiles.test/root.json?key=k", ROOT);
        let service = IonTileService::with_server(&fetcher, "https://ion.test/", "tok");

        let loaded = pollster::block_on(service.load_tileset(2_275_207)).expect("load");
        assert_eq!(loaded.url, "https://tiles.test/root.json?key=k");
        assert_eq!(loaded.attributions, vec!["Data provider".to_string()]);
    }

    #[test]
    fn failures_surface_as_errors() {
        let service = IonTileService::with_server(MapFetcher::default(), "https://ion.test", "tok");
        let err = pollster::block_on(service.load_tileset(2_275_207)).expect_err("missing");
        assert!(matches!(
            err,
            StreamingError::Fetch { source: FetchError::NotFound, .. }
        ));

        let fetcher = MapFetcher::default()
            .with(ENDPOINT, r#"{"type": "3DTILES", "url": "https://assets.test/tileset.json"}"#)
            .with("https://assets.test/tileset.json", "{\"asset\": {}}");
        let service = IonTileService::with_server(&fetcher, "https://ion.test", "tok");
        let err = pollster::block_on(service.load_tileset(2_275_207)).expect_err("bad root");
        assert!(matches!(err, StreamingError::Tileset(_)));
    }
}
