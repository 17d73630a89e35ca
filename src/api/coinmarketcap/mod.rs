pub mod client;
pub mod models;

pub use client::{CoinMarketCapClient, TickerSource};
pub use models::Asset;
