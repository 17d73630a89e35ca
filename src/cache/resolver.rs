use super::snapshot::SnapshotStore;
use crate::api::coinmarketcap::{Asset, TickerSource};
use crate::error::TickerError;
use log::{debug, warn};
use std::sync::Arc;

/// Turns a user query into up-to-date ticker data.
///
/// The cached snapshot is only used to find the asset id; the figures always
/// come from a fresh single-ticker request.
#[derive(Clone)]
pub struct Resolver {
    store: Arc<SnapshotStore>,
    source: Arc<dyn TickerSource>,
}

impl Resolver {
    pub fn new(store: Arc<SnapshotStore>, source: Arc<dyn TickerSource>) -> Self {
        Self { store, source }
    }

    /// Finds the asset in the snapshot, then fetches its current figures.
    /// Unknown queries fail with [`TickerError::NotFound`] before any request.
    pub async fn resolve(&self, query: &str) -> Result<Asset, TickerError> {
        let known = self.identify(query)?;
        self.fetch_fresh(&known).await
    }

    /// First snapshot entry whose name or symbol equals `query`, ignoring case.
    fn identify(&self, query: &str) -> Result<Asset, TickerError> {
        self.store
            .all()
            .iter()
            .find(|asset| asset.matches(query))
            .cloned()
            .ok_or_else(|| TickerError::NotFound(query.to_string()))
    }

    async fn fetch_fresh(&self, known: &Asset) -> Result<Asset, TickerError> {
        let mut fresh = self.source.ticker(&known.id).await.map_err(|e| {
            warn!("Fetching ticker {} failed: {}", known.id, e);
            e
        })?;
        fresh.fill_identity_from(known);
        debug!("Fetched fresh ticker {}", fresh.id);
        Ok(fresh)
    }
}
