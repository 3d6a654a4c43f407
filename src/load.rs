//! Design loading
//!
//! Selecting a tile is split in two so the session never waits on the
//! network while holding its state:
//!
//! 1. [`TileSession::begin_selection`](crate::session::TileSession::begin_selection)
//!    captures a fresh [`SelectionToken`] in a [`PendingSelection`]
//! 2. the pending selection is resolved (inline payloads immediately, URLs
//!    through a [`DesignFetcher`] with the `async` feature)
//! 3. [`TileSession::apply`](crate::session::TileSession::apply) installs the
//!    result only if its token is still current
//!
//! Every per-design failure degrades to [`Design::fallback`]; one broken
//! design never breaks the grid.

use std::sync::Arc;

use compact_str::CompactString;

use crate::cache::SharedDesignCache;
use crate::design::{Design, DesignSource};
use crate::error::{TileError, TileResult};
use crate::id::{DesignId, SelectionToken, TileId};

// =============================================================================
// Requests
// =============================================================================

/// One design of a selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignRequest {
    /// Also the namespace for generated path ids
    pub id: DesignId,
    pub name: Option<CompactString>,
    pub source: DesignSource,
}

impl DesignRequest {
    pub fn new(id: impl Into<DesignId>, source: DesignSource) -> Self {
        Self { id: id.into(), name: None, source }
    }

    pub fn with_name(mut self, name: impl AsRef<str>) -> Self {
        self.name = Some(CompactString::from(name.as_ref()));
        self
    }

    /// SVG text of inline and base64 sources
    fn decode_local(&self) -> TileResult<String> {
        match self.source.decode()? {
            Some(text) => Ok(text),
            None => Err(TileError::config(format!(
                "design {} needs a fetcher for its URL source",
                self.id
            ))),
        }
    }

    fn finish(&self, text: TileResult<String>, cache: &SharedDesignCache) -> Arc<Design> {
        let hint = self.id.as_str();
        let design = match text {
            Ok(svg) => cache.get_or_parse(hint, &svg),
            Err(err) => {
                tracing::warn!(design = hint, %err, "design unavailable, using fallback");
                Arc::new(Design::fallback(hint))
            }
        };
        match &self.name {
            Some(name) if design.name.as_ref() != Some(name) => {
                Arc::new(Design::clone(&design).with_name(name))
            }
            _ => design,
        }
    }
}

/// A tile the user picked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRequest {
    pub tile_id: TileId,
    /// Display name; drives the layout offset table
    pub tile_name: CompactString,
    pub designs: Vec<DesignRequest>,
}

impl SelectionRequest {
    pub fn new(tile_id: impl Into<TileId>, tile_name: impl AsRef<str>) -> Self {
        Self {
            tile_id: tile_id.into(),
            tile_name: CompactString::from(tile_name.as_ref()),
            designs: Vec::new(),
        }
    }

    pub fn design(mut self, request: DesignRequest) -> Self {
        self.designs.push(request);
        self
    }
}

// =============================================================================
// Pending / Resolved
// =============================================================================

/// A selection whose designs are not loaded yet
#[derive(Debug, Clone)]
#[must_use = "a pending selection does nothing until resolved and applied"]
pub struct PendingSelection {
    token: SelectionToken,
    request: SelectionRequest,
}

/// Loaded designs, tagged with the token they were requested under
#[derive(Debug, Clone)]
pub struct ResolvedSelection {
    pub token: SelectionToken,
    pub tile_id: TileId,
    pub tile_name: CompactString,
    pub designs: Vec<Arc<Design>>,
}

impl PendingSelection {
    pub(crate) fn new(token: SelectionToken, request: SelectionRequest) -> Self {
        Self { token, request }
    }

    pub fn token(&self) -> SelectionToken {
        self.token
    }

    pub fn request(&self) -> &SelectionRequest {
        &self.request
    }

    /// Resolve without network access; URL sources fall back.
    pub fn resolve_local(self, cache: &SharedDesignCache) -> ResolvedSelection {
        let designs = self
            .request
            .designs
            .iter()
            .map(|d| d.finish(d.decode_local(), cache))
            .collect();
        self.into_resolved(designs)
    }

    fn into_resolved(self, designs: Vec<Arc<Design>>) -> ResolvedSelection {
        ResolvedSelection {
            token: self.token,
            tile_id: self.request.tile_id,
            tile_name: self.request.tile_name,
            designs,
        }
    }
}

// =============================================================================
// Async fetch (async feature)
// =============================================================================

#[cfg(feature = "async")]
mod async_impl {
    use std::fmt;
    use std::future::Future;

    use futures_util::future::join_all;

    use super::{PendingSelection, ResolvedSelection};
    use crate::cache::SharedDesignCache;
    use crate::design::DesignSource;
    use crate::error::TileError;

    /// Fetches remote `.svg` resources.
    ///
    /// # Example
    ///
    /// ```ignore
    /// struct HttpFetcher { client: reqwest::Client }
    ///
    /// impl DesignFetcher for HttpFetcher {
    ///     type Error = reqwest::Error;
    ///
    ///     async fn fetch(&self, url: &str) -> Result<String, Self::Error> {
    ///         self.client.get(url).send().await?.text().await
    ///     }
    /// }
    /// ```
    pub trait DesignFetcher: Sync {
        type Error: fmt::Display + Send;

        fn fetch(&self, url: &str) -> impl Future<Output = Result<String, Self::Error>> + Send;
    }

    impl PendingSelection {
        /// Load every design, fetching URL sources concurrently.
        pub async fn resolve<F: DesignFetcher>(
            self,
            fetcher: &F,
            cache: &SharedDesignCache,
        ) -> ResolvedSelection {
            let loads = self.request.designs.iter().map(|d| async move {
                let text = match &d.source {
                    DesignSource::Url(url) => {
                        fetcher.fetch(url).await.map_err(|e| TileError::fetch(url.as_str(), e))
                    }
                    _ => d.decode_local(),
                };
                d.finish(text, cache)
            });
            let designs = join_all(loads).await;
            self.into_resolved(designs)
        }
    }
}

#[cfg(feature = "async")]
pub use async_impl::DesignFetcher;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    const SVG: &str = r##"<svg viewBox="0 0 100 100"><path d="M0 0H100V100H0Z" fill="#336699"/></svg>"##;

    fn pending(request: SelectionRequest) -> PendingSelection {
        PendingSelection::new(SelectionToken::initial().next(), request)
    }

    #[test]
    fn test_resolve_local_inline_and_base64() {
        let request = SelectionRequest::new("5", "Lola")
            .design(DesignRequest::new("5-0", DesignSource::Inline(SVG.into())).with_name("Lola"))
            .design(DesignRequest::new("5-1", DesignSource::Base64(STANDARD.encode(SVG))));
        let resolved = pending(request).resolve_local(&SharedDesignCache::new());

        assert_eq!(resolved.designs.len(), 2);
        assert_eq!(resolved.designs[0].name.as_deref(), Some("Lola"));
        assert_eq!(resolved.designs[0].paths[0].id, "5-0-0");
        assert_eq!(resolved.designs[1].paths[0].id, "5-1-0");
        assert_eq!(resolved.designs[1].paths[0].fill.as_deref(), Some("#336699"));
        assert_eq!(resolved.designs[1].id.as_str(), "5-1");
    }

    #[test]
    fn test_resolve_local_url_falls_back() {
        let request = SelectionRequest::new("5", "")
            .design(DesignRequest::new("5-0", DesignSource::Url("https://cdn.example.com/a.svg".into())));
        let resolved = pending(request).resolve_local(&SharedDesignCache::new());
        assert!(resolved.designs[0].is_fallback());
    }

    #[cfg(feature = "async")]
    mod fetch {
        use super::*;

        struct MapFetcher;

        impl DesignFetcher for MapFetcher {
            type Error = String;

            async fn fetch(&self, url: &str) -> Result<String, Self::Error> {
                match url {
                    "https://cdn.example.com/ok.svg" => Ok(SVG.to_string()),
                    other => Err(format!("404 for {other}")),
                }
            }
        }

        #[tokio::test]
        async fn test_resolve_fetches_urls_in_order() {
            let request = SelectionRequest::new("8", "Gio")
                .design(DesignRequest::new("8-0", DesignSource::Url("https://cdn.example.com/ok.svg".into())))
                .design(DesignRequest::new("8-1", DesignSource::Url("https://cdn.example.com/missing.svg".into())))
                .design(DesignRequest::new("8-2", DesignSource::Inline(SVG.into())));

            let resolved = pending(request).resolve(&MapFetcher, &SharedDesignCache::new()).await;

            assert_eq!(resolved.designs.len(), 3);
            assert_eq!(resolved.designs[0].paths[0].fill.as_deref(), Some("#336699"));
            assert!(resolved.designs[1].is_fallback());
            assert_eq!(resolved.designs[2].id.as_str(), "8-2");
            assert_eq!(resolved.tile_name, "Gio");
        }
    }
}
