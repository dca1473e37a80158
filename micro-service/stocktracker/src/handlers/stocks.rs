use app_error::AppResult;
use app_middleware::validation::validate_symbol;
use app_models::{PriceEntry, StockDetails};
use app_utils::QuoteClient;
use axum::{
    Json,
    extract::{Extension, Path},
};
use std::{collections::BTreeMap, sync::Arc};

/// Prices for all tracked symbols. Always 200; failed symbols carry an error entry.
pub async fn stock_prices(
    Extension(quotes): Extension<Arc<QuoteClient>>,
) -> Json<BTreeMap<String, PriceEntry>> {
    Json(quotes.price_board().await)
}

pub async fn stock_details(
    Extension(quotes): Extension<Arc<QuoteClient>>,
    Path(symbol): Path<String>,
) -> AppResult<Json<StockDetails>> {
    let symbol = validate_symbol(&symbol)?;
    Ok(Json(quotes.fetch_details(&symbol).await?))
}
