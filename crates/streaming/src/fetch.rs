/// Transport failure reported by a [`ResourceFetcher`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP status {status}")]
    Status { status: u16 },
    #[error("not found")]
    NotFound,
}

/// Text-over-HTTP, as seen by the tile service and the data loaders.
///
/// The browser build backs this with `fetch`; tests use in-memory maps.
#[allow(async_fn_in_trait)]
pub trait ResourceFetcher {
    /// GET `url`, optionally with an `Authorization: Bearer` token.
    async fn fetch_text(&self, url: &str, bearer: Option<&str>) -> Result<String, FetchError>;
}

impl<F: ResourceFetcher + ?Sized> ResourceFetcher for &F {
    async fn fetch_text(&self, url: &str, bearer: Option<&str>) -> Result<String, FetchError> {
        (**self).fetch_text(url, bearer).await
    }
}
