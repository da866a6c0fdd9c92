//! Public lookups over the cached characters and guilds.

use armory_db::models::guild::Guild;
use axum::extract::{Path, State};
use axum::Json;

use crate::error::AppResult;
use crate::response::{CharacterResponse, CharacterWithGuild, DataResponse};
use crate::state::AppState;

/// GET /owners/{owner_id}/main
pub async fn owner_main(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
) -> AppResult<Json<DataResponse<CharacterResponse>>> {
    let main = state.profiles.main_character(&owner_id).await?;
    Ok(Json(DataResponse { data: main.into() }))
}

/// GET /characters/{name}
///
/// Case-insensitive. When several owners have a character of that name the
/// one with the best mythic score is returned.
pub async fn character_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<DataResponse<CharacterWithGuild>>> {
    let (character, guild) = state.profiles.character_by_name(&name).await?;
    Ok(Json(DataResponse {
        data: CharacterWithGuild {
            character: character.into(),
            guild,
        },
    }))
}

/// GET /guilds/{name_slug}
pub async fn guild_by_slug(
    State(state): State<AppState>,
    Path(name_slug): Path<String>,
) -> AppResult<Json<DataResponse<Guild>>> {
    let guild = state.profiles.guild_by_slug(&name_slug).await?;
    Ok(Json(DataResponse { data: guild }))
}
