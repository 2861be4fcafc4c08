//! Browser `fetch` behind the streaming crate's [`ResourceFetcher`].

#[cfg(target_arch = "wasm32")]
mod imp {
    use gloo_net::http::Request;
    use streaming::{FetchError, ResourceFetcher};
    use tracing::trace;

    #[derive(Debug, Default, Copy, Clone)]
    pub struct BrowserFetcher;

    impl ResourceFetcher for BrowserFetcher {
        async fn fetch_text(&self, url: &str, bearer: Option<&str>) -> Result<String, FetchError> {
            trace!(url, "fetch");
            let mut request = Request::get(url);
            if let Some(token) = bearer {
                request = request.header("Authorization", &format!("Bearer {token}"));
            }
            let resp = request
                .send()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;
            match resp.status() {
                404 => Err(FetchError::NotFound),
                _ if !resp.ok() => Err(FetchError::Status {
                    status: resp.status(),
                }),
                _ => resp
                    .text()
                    .await
                    .map_err(|e| FetchError::Network(e.to_string())),
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use streaming::{FetchError, ResourceFetcher};

    #[derive(Debug, Default, Copy, Clone)]
    pub struct BrowserFetcher;

    impl ResourceFetcher for BrowserFetcher {
        async fn fetch_text(&self, _url: &str, _bearer: Option<&str>) -> Result<String, FetchError> {
            Err(FetchError::Network(
                "fetch is only available on wasm32 targets".to_string(),
            ))
        }
    }
}

pub use imp::BrowserFetcher;
