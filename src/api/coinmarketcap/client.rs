use super::models::Asset;
use crate::config::Config;
use crate::error::TickerError;
use futures::future::{BoxFuture, FutureExt};
use log::debug;
use reqwest::Client;

/// The two read endpoints of the price provider.
pub trait TickerSource: Send + Sync {
    /// The whole catalog.
    fn list(&self) -> BoxFuture<'_, Result<Vec<Asset>, TickerError>>;

    /// A single asset by id. Anything but exactly one record is an error.
    fn ticker<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Asset, TickerError>>;
}

pub struct CoinMarketCapClient {
    client: Client,
    list_endpoint: String,
    ticker_endpoint: String,
}

impl CoinMarketCapClient {
    pub fn new(config: &Config) -> Result<Self, TickerError> {
        let client = Client::builder().timeout(config.http_timeout()).build()?;

        Ok(Self {
            client,
            list_endpoint: config.list_endpoint.clone(),
            ticker_endpoint: config.ticker_endpoint.clone(),
        })
    }

    async fn get_assets(&self, url: &str) -> Result<Vec<Asset>, TickerError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header("accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TickerError::Status(status));
        }

        let body = response.bytes().await?;
        decode_assets(&body)
    }
}

impl TickerSource for CoinMarketCapClient {
    fn list(&self) -> BoxFuture<'_, Result<Vec<Asset>, TickerError>> {
        async move { self.get_assets(&self.list_endpoint).await }.boxed()
    }

    fn ticker<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Asset, TickerError>> {
        async move {
            let url = format!("{}{}", self.ticker_endpoint, id);
            expect_single(self.get_assets(&url).await?)
        }
        .boxed()
    }
}

pub fn decode_assets(body: &[u8]) -> Result<Vec<Asset>, TickerError> {
    Ok(serde_json::from_slice(body)?)
}

pub fn expect_single(mut assets: Vec<Asset>) -> Result<Asset, TickerError> {
    match assets.len() {
        1 => Ok(assets.remove(0)),
        n => Err(TickerError::Cardinality(n)),
    }
}
