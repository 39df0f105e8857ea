use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

/// Header carrying the authenticated user's email, set by the identity proxy
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// The signed-in user, resolved from request headers
///
/// Session issuance happens upstream; this service only trusts the email
/// forwarded alongside the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub email: String,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let email = parts
            .headers
            .get(USER_EMAIL_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .ok_or(AppError::Unauthorized)?;

        Ok(CurrentUser {
            email: email.to_lowercase(),
        })
    }
}
