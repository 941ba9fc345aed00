//! Authentication handlers: admin credentials, social login, profile.

use axum::{
    extract::{Path, Query, State},
    middleware,
    response::{Json, Redirect},
    routing::{get, post},
    Extension, Router,
};
use reqwest::Url;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{access_guard, AccessPolicy, Guarded};
use crate::api::AppState;
use crate::config::{MIN_PASSWORD_LENGTH, OAUTH_STATE_TTL_SECONDS};
use crate::domain::{AdminResponse, AuthProvider, Principal};
use crate::errors::{AppError, AppResult};
use crate::services::{AdminSession, UserSession};
use crate::types::Created;

/// Admin registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "curator@example.com")]
    pub email: String,
    /// Admin password (minimum 6 characters)
    #[validate(length(min = MIN_PASSWORD_LENGTH, message = "Password must be at least 6 characters"))]
    #[schema(example = "s3cret!", min_length = 6)]
    pub password: String,
}

/// Admin login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "curator@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "s3cret!")]
    pub password: String,
}

/// Query string of the provider callback
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by the provider when the user declined consent
    pub error: Option<String>,
}

/// Create authentication routes
pub fn auth_routes(state: &AppState) -> Router<AppState> {
    let authenticated =
        middleware::from_fn_with_state(Guarded::new(state, AccessPolicy::Authenticated), access_guard);

    Router::new()
        .route("/admin/login", post(admin_login))
        .route("/admin/register", post(admin_register))
        .route("/profile", get(profile).route_layer(authenticated))
        .route("/:provider", get(provider_redirect))
        .route("/:provider/callback", get(provider_callback))
}

/// Log in as an admin
#[utoipa::path(
    post,
    path = "/auth/admin/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AdminSession),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn admin_login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<AdminSession>> {
    let session = state
        .auth_service
        .login_admin(payload.email, payload.password)
        .await?;

    Ok(Json(session))
}

/// Register a new admin
#[utoipa::path(
    post,
    path = "/auth/admin/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Admin registered", body = AdminResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Admin already exists")
    )
)]
pub async fn admin_register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<Created<AdminResponse>> {
    let admin = state
        .auth_service
        .register_admin(payload.email, payload.password)
        .await?;

    Ok(Created(admin))
}

/// Current principal
#[utoipa::path(
    get,
    path = "/auth/profile",
    tag = "Authentication",
    responses(
        (status = 200, description = "Authenticated principal", body = Principal),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn profile(Extension(principal): Extension<Principal>) -> Json<Principal> {
    Json(principal)
}

/// Start a social login
#[utoipa::path(
    get,
    path = "/auth/{provider}",
    tag = "Authentication",
    params(("provider" = String, Path, description = "google or facebook")),
    responses(
        (status = 303, description = "Redirect to the provider consent page"),
        (status = 400, description = "Unknown or unconfigured provider")
    )
)]
pub async fn provider_redirect(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> AppResult<Redirect> {
    let provider: AuthProvider = provider.parse()?;
    let csrf_state = Uuid::new_v4().simple().to_string();

    let url = state
        .identity_provider
        .authorization_url(provider, &csrf_state)?;
    state
        .cache
        .save_oauth_state(&csrf_state, provider.as_str(), OAUTH_STATE_TTL_SECONDS)
        .await?;

    Ok(Redirect::to(&url))
}

/// Finish a social login and hand the token to the frontend
#[utoipa::path(
    get,
    path = "/auth/{provider}/callback",
    tag = "Authentication",
    params(("provider" = String, Path, description = "google or facebook"), CallbackParams),
    responses(
        (status = 303, description = "Redirect to the frontend with the access token"),
        (status = 401, description = "Unknown state, declined consent or profile without email"),
        (status = 502, description = "Provider request failed")
    )
)]
pub async fn provider_callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(params): Query<CallbackParams>,
) -> AppResult<Redirect> {
    let provider: AuthProvider = provider.parse()?;

    if let Some(error) = params.error {
        tracing::info!(%provider, %error, "Social login declined");
        return Err(AppError::Unauthorized);
    }
    let (code, csrf_state) = params
        .code
        .zip(params.state)
        .ok_or(AppError::Unauthorized)?;

    // The state is single use and must belong to this provider
    let issued_for = state.cache.take_oauth_state(&csrf_state).await?;
    if issued_for.as_deref() != Some(provider.as_str()) {
        tracing::warn!(%provider, "OAuth callback with unknown state");
        return Err(AppError::Unauthorized);
    }

    let profile = state.identity_provider.fetch_profile(provider, &code).await?;
    let UserSession { token, user } = state.auth_service.login_social_user(profile).await?;
    tracing::info!(user_id = %user.id, %provider, "Social login completed");

    Ok(Redirect::to(
        completion_url(&state.frontend_url, &token.access_token)?.as_str(),
    ))
}

fn completion_url(frontend_url: &str, token: &str) -> AppResult<Url> {
    let mut url = Url::parse(&format!("{}/auth/success", frontend_url.trim_end_matches('/')))
        .map_err(|e| AppError::internal(format!("invalid frontend url: {}", e)))?;
    url.query_pairs_mut().append_pair("token", token);
    Ok(url)
}
