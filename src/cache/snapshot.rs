use crate::api::coinmarketcap::Asset;
use log::info;
use std::sync::{Arc, RwLock};

/// The full ticker list from the last successful refresh.
///
/// The list is swapped as a whole behind an `Arc`, so a reader holds either
/// the old list or the new one and never a mix.
#[derive(Default)]
pub struct SnapshotStore {
    assets: RwLock<Arc<Vec<Asset>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `assets` unless it is empty. Returns whether the snapshot changed.
    pub fn replace(&self, assets: Vec<Asset>) -> bool {
        if assets.is_empty() {
            info!("Ticker list was empty, nothing to update");
            return false;
        }

        let count = assets.len();
        let next = Arc::new(assets);
        *self.assets.write().unwrap_or_else(|e| e.into_inner()) = next;
        info!("Loaded {} tickers", count);
        true
    }

    pub fn all(&self) -> Arc<Vec<Asset>> {
        self.assets
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.all().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.all().is_empty()
    }
}
