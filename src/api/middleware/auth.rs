//! Access guard chain: authentication gate, then authorization gate.
//!
//! Routes declare an [`AccessPolicy`]; the middleware resolves the bearer
//! token to a [`Principal`] and checks its role against the policy.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::api::AppState;
use crate::domain::{Principal, Role};
use crate::errors::{AppError, AppResult};

/// Who may call a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// No token needed
    Public,
    /// Any valid, still existing account
    Authenticated,
    /// A valid account whose role is one of these
    Roles(&'static [Role]),
}

pub const ADMIN_ONLY: AccessPolicy = AccessPolicy::Roles(&[Role::Admin]);

/// Authentication gate: bearer token -> verified claims -> live account.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> AppResult<Principal> {
    let bearer = headers
        .typed_get::<Authorization<Bearer>>()
        .ok_or(AppError::Unauthorized)?;

    let claims = state
        .auth_service
        .verify_token(bearer.token())
        .map_err(|e| {
            tracing::debug!(error = %e, "Bearer token rejected");
            AppError::Unauthorized
        })?;

    // Tokens outlive accounts; a deleted subject is treated as anonymous
    let identity = state
        .auth_service
        .validate_principal(claims.sub, claims.account_type)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(Principal {
        subject_id: identity.id(),
        email: claims.email,
        role: claims.role,
        account_type: claims.account_type,
    })
}

/// Authorization gate: passes with no declared roles, else requires membership.
pub fn authorize(principal: &Principal, roles: &[Role]) -> AppResult<()> {
    if roles.is_empty() || principal.has_any_role(roles) {
        Ok(())
    } else {
        tracing::debug!(subject = %principal.subject_id, role = %principal.role, "Role not permitted");
        Err(AppError::Forbidden)
    }
}

/// Run both gates in order for `policy`. `None` for public routes.
pub async fn run_guards(
    state: &AppState,
    headers: &HeaderMap,
    policy: AccessPolicy,
) -> AppResult<Option<Principal>> {
    let roles: &[Role] = match policy {
        AccessPolicy::Public => return Ok(None),
        AccessPolicy::Authenticated => &[],
        AccessPolicy::Roles(roles) => roles,
    };

    let principal = authenticate(state, headers).await?;
    authorize(&principal, roles)?;
    Ok(Some(principal))
}

/// Middleware state: the app plus the policy of the guarded route
#[derive(Clone)]
pub struct Guarded {
    pub state: AppState,
    pub policy: AccessPolicy,
}

impl Guarded {
    pub fn new(state: &AppState, policy: AccessPolicy) -> Self {
        Self {
            state: state.clone(),
            policy,
        }
    }
}

/// Guard middleware. On success the [`Principal`] is in the request extensions.
pub async fn access_guard(
    State(guarded): State<Guarded>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(principal) = run_guards(&guarded.state, request.headers(), guarded.policy).await? {
        request.extensions_mut().insert(principal);
    }
    Ok(next.run(request).await)
}
