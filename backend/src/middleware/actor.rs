//! Acting-user extraction
//!
//! The caller names the user behind a request in the `x-user-id` header. The
//! value is trusted as given and only checked to be a UUID.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::AppError;

pub const ACTOR_HEADER: &str = "x-user-id";

/// User on whose behalf the request runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor(pub Uuid);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(ACTOR_HEADER)
            .ok_or_else(|| AppError::validation(ACTOR_HEADER, "Missing acting user header"))?;

        raw.to_str()
            .ok()
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .map(Actor)
            .ok_or_else(|| AppError::validation(ACTOR_HEADER, "Acting user must be a UUID"))
    }
}
