use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    id: Option<String>,
}

impl UserIdQuery {
    /// Parse the `id` query parameter, treating absence like an invalid id.
    pub fn try_into_user_id(self) -> Result<UserId, UserError> {
        let id = self.id.unwrap_or_default();
        Ok(UserId::from_string(&id)?)
    }
}

pub async fn get_user(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let user_id = query.try_into_user_id()?;

    state
        .user_service
        .get_user(&user_id)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}
