use super::snapshot::SnapshotStore;
use crate::api::coinmarketcap::TickerSource;
use crate::error::TickerError;
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Periodically pulls the full ticker list into the [`SnapshotStore`].
#[derive(Clone)]
pub struct Refresher {
    source: Arc<dyn TickerSource>,
    store: Arc<SnapshotStore>,
}

/// Stops the background refresh loop when cancelled.
pub struct RefreshHandle {
    handle: JoinHandle<()>,
}

impl RefreshHandle {
    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Refresher {
    pub fn new(source: Arc<dyn TickerSource>, store: Arc<SnapshotStore>) -> Self {
        Self { source, store }
    }

    /// One fetch-and-install cycle. Returns whether the snapshot was replaced.
    pub async fn refresh_once(&self) -> Result<bool, TickerError> {
        let assets = self.source.list().await?;
        Ok(self.store.replace(assets))
    }

    /// Runs [`Refresher::refresh_once`] every `period`, starting one period
    /// from now. Failures are logged and the cached list is kept until the
    /// next tick.
    pub fn spawn(self, period: Duration) -> RefreshHandle {
        let period = period.max(Duration::from_secs(1));
        info!("Refreshing tickers every {:?}", period);

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if let Err(e) = self.refresh_once().await {
                    error!(
                        "Ticker refresh failed, keeping {} cached tickers: {}",
                        self.store.len(),
                        e
                    );
                }
            }
        });

        RefreshHandle { handle }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{asset, FakeSource};
    use reqwest::StatusCode;

    fn setup() -> (Arc<FakeSource>, Arc<SnapshotStore>, Refresher) {
        let source = Arc::new(FakeSource::new());
        let store = Arc::new(SnapshotStore::new());
        let refresher = Refresher::new(source.clone(), store.clone());
        (source, store, refresher)
    }

    #[tokio::test]
    async fn refresh_once_installs_list() {
        let (source, store, refresher) = setup();
        source.push_list(Ok(vec![asset("bitcoin", "Bitcoin", "BTC")]));

        assert!(refresher.refresh_once().await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn failed_refresh_leaves_snapshot_untouched() {
        let (source, store, refresher) = setup();
        source.push_list(Ok(vec![asset("bitcoin", "Bitcoin", "BTC")]));
        source.push_list(Err(StatusCode::BAD_GATEWAY));

        refresher.refresh_once().await.unwrap();
        let err = refresher.refresh_once().await.unwrap_err();

        assert!(matches!(err, TickerError::Status(StatusCode::BAD_GATEWAY)));
        assert_eq!(store.all()[0].id, "bitcoin");
    }

    #[tokio::test]
    async fn empty_refresh_is_not_an_update() {
        let (source, store, refresher) = setup();
        source.push_list(Ok(vec![asset("bitcoin", "Bitcoin", "BTC")]));
        source.push_list(Ok(Vec::new()));

        assert!(refresher.refresh_once().await.unwrap());
        assert!(!refresher.refresh_once().await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn loop_ticks_once_per_period_and_survives_errors() {
        let (source, store, refresher) = setup();
        source.push_list(Err(StatusCode::SERVICE_UNAVAILABLE));
        source.push_list(Ok(vec![
            asset("bitcoin", "Bitcoin", "BTC"),
            asset("ethereum", "Ethereum", "ETH"),
        ]));

        let period = Duration::from_secs(300);
        let handle = refresher.spawn(period);

        tokio::time::sleep(period / 2).await;
        assert_eq!(source.list_calls(), 0);

        tokio::time::sleep(period).await;
        assert_eq!(source.list_calls(), 1);
        assert!(store.is_empty());

        tokio::time::sleep(period).await;
        assert_eq!(source.list_calls(), 2);
        assert_eq!(store.len(), 2);

        handle.cancel();
        tokio::time::sleep(period * 3).await;
        assert_eq!(source.list_calls(), 2);
    }
}
