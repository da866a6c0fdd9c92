//! Guild entity model and DTOs.

use armory_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A guild row from the `guilds` table, keyed by the owning character.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Guild {
    pub character_id: DbId,
    pub guild_id: i64,
    pub name: String,
    pub name_slug: String,
    pub realm: String,
    pub realm_slug: String,
    pub faction: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for upserting a guild membership.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateGuild {
    pub character_id: DbId,
    pub guild_id: i64,
    pub name: String,
    pub name_slug: String,
    pub realm: String,
    pub realm_slug: String,
    pub faction: String,
}
