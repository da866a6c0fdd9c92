//! Character entity model.

use armory_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A character row from the `characters` table.
///
/// Upserts take [`armory_core::roster::CharacterRecord`] directly, so there
/// is no separate create DTO.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Character {
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
    /// NOT NULL in the database; defaults to `0`.
    pub mythic_score: f64,
    pub is_main: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
