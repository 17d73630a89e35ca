use crate::api::coinmarketcap::Asset;
use chrono::{DateTime, SecondsFormat};
use num_format::{Locale, ToFormattedString};
use serde::Serialize;

pub const EMBED_TITLE: &str = "Coin Market Cap";
const CURRENCY_URL: &str = "https://coinmarketcap.com/currencies/";
const ICON_URL: &str = "https://files.coinmarketcap.com/static/img/coins/32x32/";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embed {
    pub title: String,
    pub url: String,
    pub author: EmbedAuthor,
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedAuthor {
    pub name: String,
    pub icon_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    fn new(name: &str, value: String, inline: bool) -> Self {
        Self {
            name: name.to_string(),
            value,
            inline,
        }
    }
}

#[cfg(test)]
impl Embed {
    pub fn field(&self, name: &str) -> Option<&EmbedField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Builds the ticker card. Fields whose source value is empty or does not
/// parse are left out.
pub fn ticker_embed(asset: &Asset) -> Embed {
    let figures = asset.figures();
    let mut fields = Vec::new();

    if !asset.rank.is_empty() {
        fields.push(EmbedField::new(
            "Coin Market Cap Rank",
            format!("#{}", asset.rank),
            false,
        ));
    }
    if !asset.price_usd.is_empty() {
        fields.push(EmbedField::new(
            "Price USD",
            format!("${}", asset.price_usd),
            true,
        ));
    }
    if !asset.price_btc.is_empty() {
        fields.push(EmbedField::new(
            "Price BTC",
            format!("{} BTC", asset.price_btc),
            true,
        ));
    }
    if let Some(cap) = figures.market_cap_usd {
        fields.push(EmbedField::new("Market Cap", format_market_cap(cap), false));
    }

    let changes = [
        ("Percent Change 1 hour", figures.change_1h),
        ("Percent Change 24 hours", figures.change_24h),
        ("Percent Change 7 days", figures.change_7d),
    ];
    for (name, change) in changes {
        if let Some(change) = change {
            fields.push(EmbedField::new(name, format!("{:.2}%", change), true));
        }
    }

    Embed {
        title: EMBED_TITLE.to_string(),
        url: format!("{}{}", CURRENCY_URL, asset.id),
        author: EmbedAuthor {
            name: format!("{} ({})", asset.name, asset.symbol),
            icon_url: format!("{}{}.png", ICON_URL, asset.id),
        },
        fields,
        timestamp: figures
            .last_updated
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)),
    }
}

fn format_market_cap(cap: f64) -> String {
    let whole = cap.round() as i64;
    if whole < 0 {
        format!("-${}", whole.unsigned_abs().to_formatted_string(&Locale::en))
    } else {
        format!("${}", whole.to_formatted_string(&Locale::en))
    }
}
