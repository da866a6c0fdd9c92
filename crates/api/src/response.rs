//! Shared response envelope and payload types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope. Use
//! [`DataResponse`] instead of ad-hoc `serde_json::json!({ "data": ... })`.

use armory_core::roster::Owner;
use armory_core::types::{DbId, Timestamp};
use armory_db::models::character::Character;
use armory_db::models::guild::Guild;
use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// A stored character as returned to clients.
#[derive(Debug, Serialize)]
pub struct CharacterResponse {
    pub id: DbId,
    pub owner_id: String,
    pub battletag: String,
    pub name: String,
    pub realm: String,
    pub race: String,
    pub faction: String,
    pub class: String,
    pub spec: String,
    pub level: i32,
    pub item_level: i32,
    pub guild: Option<String>,
    /// Rounded to two decimals.
    pub mythic_score: f64,
    pub is_main: bool,
    pub updated_at: Timestamp,
}

impl From<Character> for CharacterResponse {
    fn from(c: Character) -> Self {
        Self {
            id: c.id,
            owner_id: c.owner_id,
            battletag: c.battletag,
            name: c.name,
            realm: c.realm,
            race: c.race,
            faction: c.faction,
            class: c.class,
            spec: c.spec,
            level: c.level,
            item_level: c.item_level,
            guild: c.guild,
            mythic_score: round_score(c.mythic_score),
            is_main: c.is_main,
            updated_at: c.updated_at,
        }
    }
}

/// The caller's roster.
#[derive(Debug, Serialize)]
pub struct RosterResponse {
    pub owner_id: String,
    pub battletag: String,
    pub characters: Vec<CharacterResponse>,
}

impl RosterResponse {
    pub fn new(owner: &Owner, characters: Vec<Character>) -> Self {
        Self {
            owner_id: owner.id.clone(),
            battletag: owner.battletag.clone(),
            characters: characters.into_iter().map(CharacterResponse::from).collect(),
        }
    }
}

/// Result of a main-character change.
#[derive(Debug, Serialize)]
pub struct SetMainResponse {
    pub message: String,
    pub character: CharacterResponse,
}

/// A character together with the guild row stored for it.
#[derive(Debug, Serialize)]
pub struct CharacterWithGuild {
    pub character: CharacterResponse,
    pub guild: Option<Guild>,
}

fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}
