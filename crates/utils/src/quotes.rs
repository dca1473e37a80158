use app_config::QuotesConfig;
use app_error::{AppError, AppResult};
use app_models::{PriceEntry, Quote, StockDetails};
use reqwest::Client;
use std::{collections::BTreeMap, fmt, time::Duration};
use tracing::{debug, error, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the upstream `/quote` API
#[derive(Clone)]
pub struct QuoteClient {
    client: Client,
    base_url: String,
    api_key: String,
    symbols: Vec<String>,
}

impl QuoteClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        symbols: Vec<String>,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            symbols,
        })
    }

    pub fn from_config(config: &QuotesConfig) -> AppResult<Self> {
        if config.api_key.trim().is_empty() {
            warn!("No quote API key configured, upstream requests will likely be refused");
        }

        Self::new(&config.base_url, &config.api_key, config.symbols.clone())
    }

    /// Tracked symbols shown on the price board
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Fetch the raw quote for one symbol
    pub async fn fetch_quote(&self, symbol: &str) -> AppResult<Quote> {
        let url = format!("{}/quote", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("symbol", symbol), ("token", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                // The URL carries the API key
                let e = e.without_url();
                error!("Failed to reach quote API for {}: {}", symbol, e);
                AppError::NetworkError(format!("Failed to connect to quote API: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("Quote API returned HTTP {} for {}", status, symbol);
            return Err(AppError::NetworkError(format!(
                "Quote API request failed: HTTP {}",
                status
            )));
        }

        let quote = response.json::<Quote>().await.map_err(|e| {
            let e = e.without_url();
            error!("Failed to parse quote for {}: {}", symbol, e);
            AppError::NetworkError(format!("Invalid quote API response: {}", e))
        })?;

        debug!("Fetched quote for {}", symbol);
        Ok(quote)
    }

    /// Current and previous close, formatted with two decimals
    pub async fn fetch_price(&self, symbol: &str) -> AppResult<PriceEntry> {
        let quote = self.fetch_quote(symbol).await?;
        Ok(PriceEntry::from_quote(&quote))
    }

    pub async fn fetch_details(&self, symbol: &str) -> AppResult<StockDetails> {
        self.fetch_quote(symbol)
            .await
            .map(StockDetails::from)
            .map_err(|e| {
                debug!("Stock details unavailable: {}", e);
                AppError::NetworkError("Unable to fetch stock details".to_string())
            })
    }

    /// Prices for every tracked symbol, one request after another.
    /// A failed symbol gets an error entry instead of failing the board.
    pub async fn price_board(&self) -> BTreeMap<String, PriceEntry> {
        let mut board = BTreeMap::new();

        for symbol in &self.symbols {
            let entry = self
                .fetch_price(symbol)
                .await
                .unwrap_or_else(|_| PriceEntry::unavailable());
            board.insert(symbol.clone(), entry);
        }

        board
    }
}

impl fmt::Debug for QuoteClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuoteClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("symbols", &self.symbols)
            .finish()
    }
}
