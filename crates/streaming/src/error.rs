use formats::TilesetParseError;

use crate::fetch::FetchError;

#[derive(Debug, thiserror::Error)]
pub enum StreamingError {
    #[error("request to {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("malformed asset endpoint response: {0}")]
    Endpoint(#[source] serde_json::Error),
    #[error("asset is not a 3D Tiles dataset (type {kind})")]
    UnsupportedAsset { kind: String },
    #[error("asset endpoint response carries no tileset url")]
    MissingUrl,
    #[error(transparent)]
    Tileset(#[from] TilesetParseError),
}
