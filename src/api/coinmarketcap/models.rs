use serde::{Deserialize, Deserializer};

/// One instrument as reported by the v1 ticker endpoints.
///
/// Every field is kept as the provider's string. Missing or `null` values
/// become empty strings; numeric interpretation happens in [`Asset::figures`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Asset {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub symbol: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub rank: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub price_usd: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub price_btc: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub market_cap_usd: String,
    #[serde(rename = "percent_change_1h", default, deserialize_with = "null_as_empty")]
    pub change_1h: String,
    #[serde(rename = "percent_change_24h", default, deserialize_with = "null_as_empty")]
    pub change_24h: String,
    #[serde(rename = "percent_change_7d", default, deserialize_with = "null_as_empty")]
    pub change_7d: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last_updated: String,
}

/// Best-effort numeric view of an [`Asset`]. `None` means the source string
/// was empty or not a finite number.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Figures {
    pub market_cap_usd: Option<f64>,
    pub change_1h: Option<f64>,
    pub change_24h: Option<f64>,
    pub change_7d: Option<f64>,
    pub last_updated: Option<i64>,
}

impl Asset {
    /// Case-insensitive exact match against either the name or the symbol.
    pub fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase() == query.to_lowercase()
            || self.symbol.to_lowercase() == query.to_lowercase()
    }

    pub fn figures(&self) -> Figures {
        Figures {
            market_cap_usd: parse_decimal(&self.market_cap_usd),
            change_1h: parse_decimal(&self.change_1h),
            change_24h: parse_decimal(&self.change_24h),
            change_7d: parse_decimal(&self.change_7d),
            last_updated: self.last_updated.trim().parse::<i64>().ok(),
        }
    }

    /// Fills empty identity fields from the snapshot entry this record was
    /// resolved through.
    pub fn fill_identity_from(&mut self, known: &Asset) {
        if self.name.is_empty() {
            self.name = known.name.clone();
        }
        if self.symbol.is_empty() {
            self.symbol = known.symbol.clone();
        }
    }
}

fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
