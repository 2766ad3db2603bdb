use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::UserData;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;
use crate::user::errors::UserIdError;
use crate::user::ports::UserServicePort;

/// HTTP request body for updating a user (raw JSON).
///
/// The target user is named by `id` in the body.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub avatar: Option<String>,
}

impl UpdateUserRequest {
    fn try_into_command(self) -> Result<(UserId, UpdateUserCommand), UserError> {
        let id = self
            .id
            .ok_or_else(|| UserIdError::InvalidFormat("id is required".to_string()))?;
        let user_id = UserId::try_from(id)?;

        // Validation happens here - errors are automatically converted via #[from]
        let username = self.username.map(Username::new).transpose()?;

        Ok((
            user_id,
            UpdateUserCommand {
                username,
                password: self.password,
                avatar: self.avatar,
            },
        ))
    }
}

pub async fn update_user(
    State(state): State<AppState>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let Json(req) = body?;
    let (user_id, command) = req.try_into_command()?;

    state
        .user_service
        .update_user(&user_id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::CREATED, user.into()))
}
