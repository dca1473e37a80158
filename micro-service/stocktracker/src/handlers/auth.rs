use app_error::AppResult;
use app_models::{CredentialsInput, LoginResponse, MessageResponse};
use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;

use crate::service::{AuthService, AuthServiceTrait};

pub async fn register(
    Extension(auth_service): Extension<Arc<AuthService>>,
    payload: Result<Json<CredentialsInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let Json(input) = payload?;
    auth_service.register(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

pub async fn login(
    Extension(auth_service): Extension<Arc<AuthService>>,
    payload: Result<Json<CredentialsInput>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let Json(input) = payload?;
    Ok(Json(auth_service.login(input).await?))
}
