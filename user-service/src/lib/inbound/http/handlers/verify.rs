use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::BearerToken;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn verify(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ApiSuccess<VerifyResponseData>, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| AuthError::MalformedAuthorization))
        .transpose()?;

    let token = BearerToken::from_authorization_header(header)?;

    state.auth_service.verify(&token).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        VerifyResponseData { message: true },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyResponseData {
    pub message: bool,
}
