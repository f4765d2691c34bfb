//! Authentication and role-check middleware.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::metrics;

use super::jwt::{CurrentUser, JwtError, JwtService};
use super::roles::Role;

/// Require a valid bearer token.
///
/// On success the caller is available to handlers as `Extension<CurrentUser>`.
///
/// | Failure | Response |
/// |---------|----------|
/// | no `Authorization` header | 401 `Authentication required` |
/// | malformed header, bad signature, bad claims | 401 `Invalid token` |
/// | expired token | 401 `Token expired` |
pub async fn require_auth(
    State(jwt): State<Arc<JwtService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match header {
        Some(value) => JwtService::extract_from_header(value).ok_or_else(|| {
            warn!(target: "security", uri = %req.uri(), "malformed authorization header");
            metrics::inc_auth_rejections("malformed_header");
            ApiError::InvalidToken
        })?,
        None => {
            warn!(target: "security", uri = %req.uri(), "missing authorization header");
            metrics::inc_auth_rejections("missing_token");
            return Err(ApiError::Unauthorized);
        }
    };

    let user = jwt
        .validate_token(token)
        .and_then(CurrentUser::try_from)
        .map_err(|e| {
            warn!(target: "security", uri = %req.uri(), error = %e, "token rejected");
            match e {
                JwtError::ExpiredToken => {
                    metrics::inc_auth_rejections("expired_token");
                    ApiError::TokenExpired
                }
                _ => {
                    metrics::inc_auth_rejections("invalid_token");
                    ApiError::InvalidToken
                }
            }
        })?;

    debug!(user_id = user.id, role = %user.role, "authenticated");
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Require the caller's role to be in `allowed`.
///
/// Must be layered inside [`require_auth`]. Runs before body extraction, so a
/// rejected request never reaches the handler.
///
/// ```ignore
/// Router::new()
///     .route("/issues", post(create_issue))
///     .layer(middleware::from_fn(require_role(ISSUE_REPORTERS)));
/// ```
pub fn require_role(
    allowed: &'static [Role],
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Result<Response, ApiError>> + Send>>
       + Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or(ApiError::Unauthorized)?;

            if !user.role.is_allowed(allowed) {
                warn!(
                    target: "security",
                    user_id = user.id,
                    role = %user.role,
                    uri = %req.uri(),
                    "role not allowed"
                );
                metrics::inc_auth_rejections("forbidden_role");
                return Err(ApiError::Forbidden);
            }

            Ok(next.run(req).await)
        })
    }
}
