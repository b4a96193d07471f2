//! Caller identity extraction.
//!
//! Authentication happens upstream; by the time a request reaches the store
//! the gateway in front of it has set:
//!
//! ```text
//! X-User-Id: <user id>
//! X-User-Role: admin        (optional)
//! ```

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::foundation::{Actor, UserId};

use super::error::ApiError;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Actor);

impl CurrentUser {
    pub fn user_id(&self) -> &UserId {
        &self.0.user_id
    }

    pub fn into_actor(self) -> Actor {
        self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| UserId::new(s.trim()).ok())
            .ok_or_else(|| ApiError::Unauthorized("Authentication is required".to_string()))?;

        let is_admin = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|role| role.trim().eq_ignore_ascii_case("admin"))
            .unwrap_or(false);

        let actor = if is_admin {
            Actor::admin(user_id)
        } else {
            Actor::customer(user_id)
        };
        Ok(CurrentUser(actor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<CurrentUser, ApiError> {
        let (mut parts, _) = request.into_parts();
        CurrentUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn missing_user_header_is_unauthorized() {
        let err = extract(Request::new(())).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn role_header_marks_admins() {
        let request = Request::builder()
            .header(USER_ID_HEADER, "ops-1")
            .header(USER_ROLE_HEADER, "Admin")
            .body(())
            .unwrap();
        let user = extract(request).await.unwrap();
        assert!(user.0.is_admin());
        assert_eq!(user.user_id().as_str(), "ops-1");
    }

    #[tokio::test]
    async fn other_roles_are_customers() {
        let request = Request::builder()
            .header(USER_ID_HEADER, "buyer-1")
            .header(USER_ROLE_HEADER, "editor")
            .body(())
            .unwrap();
        assert!(!extract(request).await.unwrap().0.is_admin());
    }
}
