use app_error::AppResult;
use app_middleware::AuthenticatedUser;
use app_models::{AddFavoriteInput, FavoriteView, MessageResponse};
use axum::{
    Json,
    extract::{Extension, Path, rejection::JsonRejection},
};
use std::sync::Arc;

use crate::service::PortfolioService;

pub async fn add_favorite(
    user: AuthenticatedUser,
    Extension(portfolio): Extension<Arc<PortfolioService>>,
    payload: Result<Json<AddFavoriteInput>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(input) = payload?;
    portfolio.add_favorite(&user.username, &input.symbol).await?;

    Ok(Json(MessageResponse::new("Stock added to portfolio")))
}

pub async fn list_favorites(
    user: AuthenticatedUser,
    Extension(portfolio): Extension<Arc<PortfolioService>>,
) -> AppResult<Json<Vec<FavoriteView>>> {
    Ok(Json(portfolio.list_favorites(&user.username).await?))
}

pub async fn remove_favorite(
    user: AuthenticatedUser,
    Extension(portfolio): Extension<Arc<PortfolioService>>,
    Path(symbol): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    portfolio.remove_favorite(&user.username, &symbol).await?;

    Ok(Json(MessageResponse::new("Stock removed from portfolio")))
}
