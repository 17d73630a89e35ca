pub mod coinmarketcap;
pub mod discord;
