//! Wire format of the asset endpoint service.
//!
//! `GET {server}/v1/assets/{id}/endpoint?access_token=...` answers with either
//! a directly hosted tileset:
//!
//! ```json
//! {"type": "3DTILES", "url": "https://assets.example/1/tileset.json", "accessToken": "..."}
//! ```
//!
//! or an externally hosted one:
//!
//! ```json
//! {"type": "3DTILES", "externalType": "3DTILES", "options": {"url": "https://tile.googleapis.com/v1/3dtiles/root.json?key=..."}}
//! ```

use serde::Deserialize;

use crate::error::StreamingError;

pub const DEFAULT_TILE_SERVER: &str = "https://api.cesium.com";

const TILES_TYPE: &str = "3DTILES";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetEndpoint {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub external_type: Option<String>,
    #[serde(default)]
    pub options: Option<ExternalOptions>,
    #[serde(default)]
    pub attributions: Vec<Attribution>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExternalOptions {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Attribution {
    #[serde(default)]
    pub html: String,
}

/// Where to fetch the root tileset document, and with which token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilesetLocation {
    pub url: String,
    pub bearer: Option<String>,
}

pub fn endpoint_url(server: &str, asset_id: u64, access_token: &str) -> String {
    let server = server.trim_end_matches('/');
    if access_token.is_empty() {
        format!("{server}/v1/assets/{asset_id}/endpoint")
    } else {
        format!("{server}/v1/assets/{asset_id}/endpoint?access_token={access_token}")
    }
}

impl AssetEndpoint {
    pub fn from_json_str(payload: &str) -> Result<Self, StreamingError> {
        serde_json::from_str(payload).map_err(StreamingError::Endpoint)
    }

    pub fn tileset_location(&self) -> Result<TilesetLocation, StreamingError> {
        if self.kind != TILES_TYPE {
            return Err(StreamingError::UnsupportedAsset {
                kind: self.kind.clone(),
            });
        }
        match self.external_type.as_deref() {
            None => {
                let url = self.url.clone().ok_or(StreamingError::MissingUrl)?;
                Ok(TilesetLocation {
                    url,
                    bearer: self.access_token.clone(),
                })
            }
            Some(TILES_TYPE) => {
                let url = self
                    .options
                    .as_ref()
                    .and_then(|o| o.url.clone())
                    .ok_or(StreamingError::MissingUrl)?;
                Ok(TilesetLocation { url, bearer: None })
            }
            Some(other) => Err(StreamingError::UnsupportedAsset {
                kind: other.to_string(),
            }),
        }
    }
}
