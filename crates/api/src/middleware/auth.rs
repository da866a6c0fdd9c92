//! Session-based authentication extractor for Axum handlers.

use armory_core::error::CoreError;
use armory_core::roster::Owner;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

/// Authenticated player resolved from the Bearer session token in the
/// `Authorization` header.
///
/// The identity service is asked who the token belongs to on every request.
/// The raw token is kept so handlers can exchange it for a Battle.net
/// access token.
///
/// ```ignore
/// async fn my_handler(player: AuthPlayer) -> AppResult<Json<()>> {
///     tracing::info!(owner_id = %player.owner.id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthPlayer {
    pub owner: Owner,
    pub session_token: String,
}

impl FromRequestParts<AppState> for AuthPlayer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Invalid Authorization format. Expected: Bearer <token>".into(),
                ))
            })?;

        let user = state.identity.resolve_user(token).await?;

        Ok(AuthPlayer {
            owner: Owner {
                id: user.id,
                battletag: user.battletag,
            },
            session_token: token.to_string(),
        })
    }
}
