use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::PageRequest;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::PageRequestError;
use crate::user::errors::UserError;

pub const CURSOR_HEADER: &str = "x-cursor";

/// Raw listing query. Both fields stay strings so bad input is reported by us.
#[derive(Debug, Default, Deserialize)]
pub struct FetchUsersQuery {
    page: Option<String>,
    num: Option<String>,
}

impl FetchUsersQuery {
    fn try_into_page_request(self) -> Result<PageRequest, UserError> {
        let page = match self.page.as_deref().map(str::trim) {
            None | Some("") => 1,
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| PageRequestError::MalformedPage(raw.to_string()))?,
        };

        // Unusable sizes fall back to the default rather than failing
        let num = self
            .num
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|num| *num != 0)
            .unwrap_or(i64::from(PageRequest::DEFAULT_PAGE_SIZE));

        Ok(PageRequest::new(page, num)?)
    }
}

pub async fn fetch_users(
    State(state): State<AppState>,
    Query(query): Query<FetchUsersQuery>,
) -> Result<([(&'static str, String); 1], ApiSuccess<Vec<UserData>>), ApiError> {
    let request = query.try_into_page_request()?;

    let page = state.user_service.fetch_users(request).await?;
    let users = page.users.iter().map(UserData::from).collect();

    Ok((
        [(CURSOR_HEADER, page.next_page.to_string())],
        ApiSuccess::new(StatusCode::OK, users),
    ))
}
