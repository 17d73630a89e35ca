//! In-memory collaborators shared by the unit tests.

use crate::api::coinmarketcap::{Asset, TickerSource};
use crate::bot::embed::Embed;
use crate::bot::EmbedSender;
use crate::error::{DiscordError, TickerError};
use futures::future::{BoxFuture, FutureExt};
use reqwest::StatusCode;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn asset(id: &str, name: &str, symbol: &str) -> Asset {
    Asset {
        id: id.to_string(),
        name: name.to_string(),
        symbol: symbol.to_string(),
        ..Default::default()
    }
}

/// Scripted provider. `list` pops queued responses and repeats the last one
/// once the queue is drained; `ticker` answers from a per-id table.
#[derive(Default)]
pub struct FakeSource {
    lists: Mutex<VecDeque<Result<Vec<Asset>, StatusCode>>>,
    last_list: Mutex<Option<Result<Vec<Asset>, StatusCode>>>,
    tickers: Mutex<HashMap<String, Result<Vec<Asset>, StatusCode>>>,
    pub list_calls: AtomicUsize,
    pub ticker_calls: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_list(&self, response: Result<Vec<Asset>, StatusCode>) {
        self.lists.lock().unwrap().push_back(response);
    }

    pub fn set_ticker(&self, id: &str, response: Result<Vec<Asset>, StatusCode>) {
        self.tickers
            .lock()
            .unwrap()
            .insert(id.to_string(), response);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn ticker_calls(&self) -> usize {
        self.ticker_calls.load(Ordering::SeqCst)
    }
}

impl TickerSource for FakeSource {
    fn list(&self) -> BoxFuture<'_, Result<Vec<Asset>, TickerError>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let next = {
            let mut lists = self.lists.lock().unwrap();
            let mut last = self.last_list.lock().unwrap();
            if let Some(response) = lists.pop_front() {
                *last = Some(response.clone());
            }
            last.clone().unwrap_or(Ok(Vec::new()))
        };
        async move { next.map_err(TickerError::Status) }.boxed()
    }

    fn ticker<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Asset, TickerError>> {
        self.ticker_calls.fetch_add(1, Ordering::SeqCst);
        let response = self
            .tickers
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or(Err(StatusCode::NOT_FOUND));
        async move {
            let assets = response.map_err(TickerError::Status)?;
            crate::api::coinmarketcap::client::expect_single(assets)
        }
        .boxed()
    }
}

/// Embed sender that records every payload and optionally fails delivery.
/// With `hold_first` set, the first delivery waits until the notify fires.
#[derive(Default)]
pub struct RecordingSender {
    pub sent: Mutex<Vec<(String, Embed)>>,
    pub fail: bool,
    pub hold_first: Option<Arc<Notify>>,
}

impl RecordingSender {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn holding_first(release: Arc<Notify>) -> Self {
        Self {
            hold_first: Some(release),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, Embed)> {
        self.sent.lock().unwrap().clone()
    }
}

impl EmbedSender for RecordingSender {
    fn send_embed<'a>(
        &'a self,
        channel_id: &'a str,
        embed: &'a Embed,
    ) -> BoxFuture<'a, Result<(), DiscordError>> {
        let hold = {
            let mut sent = self.sent.lock().unwrap();
            sent.push((channel_id.to_string(), embed.clone()));
            if sent.len() == 1 {
                self.hold_first.clone()
            } else {
                None
            }
        };
        let fail = self.fail;
        async move {
            if let Some(release) = hold {
                release.notified().await;
            }
            if fail {
                Err(DiscordError::Status(StatusCode::INTERNAL_SERVER_ERROR))
            } else {
                Ok(())
            }
        }
        .boxed()
    }
}
