use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::error_handling::HandleErrorLayer;
use axum::http::Request;
use axum::http::Response;
use axum::routing::get;
use axum::routing::post;
use axum::BoxError;
use axum::Router;
use tower::timeout::error::Elapsed;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::create_user::create_user;
use super::handlers::delete_user::delete_user;
use super::handlers::fetch_users::fetch_users;
use super::handlers::get_user::get_user;
use super::handlers::login::login;
use super::handlers::update_user::update_user;
use super::handlers::verify::verify;
use super::handlers::ApiError;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::user::ports::UserServicePort;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServicePort>,
    pub auth_service: Arc<dyn AuthServicePort>,
}

pub fn create_router(
    user_service: Arc<dyn UserServicePort>,
    auth_service: Arc<dyn AuthServicePort>,
    request_timeout: Duration,
) -> Router {
    let state = AppState {
        user_service,
        auth_service,
    };

    let user_routes = Router::new()
        .route(
            "/users",
            get(fetch_users)
                .post(create_user)
                .put(update_user)
                .delete(delete_user),
        )
        .route("/users/detail", get(get_user));

    let auth_routes = Router::new()
        .route("/login", post(login))
        .route("/verify", get(verify));

    // Headers are left out of the span since they carry bearer tokens
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    // Dropping the handler future on timeout also drops any pending store call
    let deadline = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(handle_middleware_error))
        .layer(TimeoutLayer::new(request_timeout));

    Router::new()
        .merge(user_routes)
        .merge(auth_routes)
        .layer(deadline)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        tracing::warn!("Request deadline exceeded");
        ApiError::RequestTimeout("request timed out".to_string())
    } else {
        ApiError::internal(err)
    }
}
