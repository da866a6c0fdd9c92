//! Handlers for the caller's own roster under `/profile`.
//!
//! Every handler here requires an [`AuthPlayer`]. Roster reads also
//! exchange the session for a Battle.net access token.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthPlayer;
use crate::response::{CharacterResponse, DataResponse, RosterResponse, SetMainResponse};
use crate::state::AppState;

/// Query parameters for `PUT /profile/main`.
#[derive(Debug, Deserialize, Validate)]
pub struct SetMainParams {
    #[serde(default)]
    #[validate(length(min = 1, max = 64, message = "character must be 1-64 characters"))]
    pub character: String,
}

/// GET /profile/characters
///
/// Served from the cache when the player has any stored characters,
/// otherwise fetched from Battle.net and stored first.
pub async fn get_characters(
    State(state): State<AppState>,
    player: AuthPlayer,
) -> AppResult<Json<DataResponse<RosterResponse>>> {
    let access_token = state.identity.exchange_token(&player.session_token).await?;

    // Dropping the handler future (timeout, client gone) cancels the fetch.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let characters = state
        .profiles
        .get_characters(&player.owner, &access_token, &cancel)
        .await?;

    Ok(Json(DataResponse {
        data: RosterResponse::new(&player.owner, characters),
    }))
}

/// GET /profile/refresh
///
/// Re-fetches the roster from Battle.net and overwrites the cache.
pub async fn refresh_characters(
    State(state): State<AppState>,
    player: AuthPlayer,
) -> AppResult<Json<DataResponse<RosterResponse>>> {
    let access_token = state.identity.exchange_token(&player.session_token).await?;

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let characters = state
        .profiles
        .refresh_characters(&player.owner, &access_token, &cancel)
        .await?;

    tracing::info!(
        owner_id = %player.owner.id,
        count = characters.len(),
        "Roster refreshed",
    );

    Ok(Json(DataResponse {
        data: RosterResponse::new(&player.owner, characters),
    }))
}

/// PUT /profile/main?character={name}
pub async fn set_main(
    State(state): State<AppState>,
    player: AuthPlayer,
    Query(params): Query<SetMainParams>,
) -> AppResult<Json<DataResponse<SetMainResponse>>> {
    params
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let main = state
        .profiles
        .set_main(&player.owner.id, params.character.trim())
        .await?;

    Ok(Json(DataResponse {
        data: SetMainResponse {
            message: format!("{} is now the main character", main.name),
            character: main.into(),
        },
    }))
}

/// GET /profile/main
pub async fn get_main(
    State(state): State<AppState>,
    player: AuthPlayer,
) -> AppResult<Json<DataResponse<CharacterResponse>>> {
    let main = state.profiles.main_character(&player.owner.id).await?;
    Ok(Json(DataResponse { data: main.into() }))
}
