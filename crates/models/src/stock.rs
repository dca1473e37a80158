use serde::{Deserialize, Serialize};

/// Quote payload returned by the upstream `/quote` endpoint.
///
/// Only the fields this service reads are declared; the upstream does not
/// always send a volume, hence the default.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Quote {
    #[serde(rename = "c")]
    pub current: f64,
    #[serde(rename = "pc")]
    pub previous_close: f64,
    #[serde(rename = "h")]
    pub high: f64,
    #[serde(rename = "l")]
    pub low: f64,
    #[serde(rename = "o")]
    pub open: f64,
    #[serde(rename = "v", default)]
    pub volume: i64,
}

/// One row of the price board: either both prices or an error marker
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum PriceEntry {
    Price { current: String, previous: String },
    Error { error: String },
}

impl PriceEntry {
    pub fn from_quote(quote: &Quote) -> Self {
        Self::Price {
            current: format!("{:.2}", quote.current),
            previous: format!("{:.2}", quote.previous_close),
        }
    }

    pub fn unavailable() -> Self {
        Self::Error {
            error: "Unable to fetch data".to_string(),
        }
    }
}

/// Response of `GET /api/stock/{symbol}`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StockDetails {
    #[serde(rename = "h")]
    pub high: f64,
    #[serde(rename = "l")]
    pub low: f64,
    #[serde(rename = "o")]
    pub open: f64,
    #[serde(rename = "v")]
    pub volume: i64,
}

impl From<Quote> for StockDetails {
    fn from(quote: Quote) -> Self {
        Self {
            high: quote.high,
            low: quote.low,
            open: quote.open,
            volume: quote.volume,
        }
    }
}
