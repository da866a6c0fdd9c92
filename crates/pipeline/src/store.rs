//! Cache storage seen by the orchestrator.

use std::future::Future;
use std::sync::Arc;

use armory_core::roster::CharacterRecord;
use armory_db::models::character::Character;
use armory_db::models::guild::{CreateGuild, Guild};
use armory_db::repositories::{CharacterRepo, GuildRepo};
use armory_db::DbPool;

/// Read/write access to the character and guild cache.
pub trait CharacterStore: Send + Sync + 'static {
    /// All of an owner's characters, best mythic score first.
    fn characters_by_owner(
        &self,
        owner_id: &str,
    ) -> impl Future<Output = Result<Vec<Character>, sqlx::Error>> + Send;

    /// Upsert a batch keyed on `(owner_id, name, realm)`, returning the
    /// stored rows. A stored `is_main` flag survives the upsert.
    fn save_characters(
        &self,
        batch: &[CharacterRecord],
    ) -> impl Future<Output = Result<Vec<Character>, sqlx::Error>> + Send;

    fn save_guilds(
        &self,
        batch: &[CreateGuild],
    ) -> impl Future<Output = Result<u64, sqlx::Error>> + Send;

    /// Remove the guild rows attached to these characters.
    fn clear_guilds(
        &self,
        character_ids: &[i64],
    ) -> impl Future<Output = Result<u64, sqlx::Error>> + Send;

    /// Atomically make `name` the owner's only main character.
    /// `Ok(None)` when the owner has no such character; nothing changes.
    fn set_main(
        &self,
        owner_id: &str,
        name: &str,
    ) -> impl Future<Output = Result<Option<Character>, sqlx::Error>> + Send;

    fn find_main(
        &self,
        owner_id: &str,
    ) -> impl Future<Output = Result<Option<Character>, sqlx::Error>> + Send;

    fn character_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Character>, sqlx::Error>> + Send;

    fn guild_for_character(
        &self,
        character_id: i64,
    ) -> impl Future<Output = Result<Option<Guild>, sqlx::Error>> + Send;

    fn guild_by_slug(
        &self,
        name_slug: &str,
    ) -> impl Future<Output = Result<Option<Guild>, sqlx::Error>> + Send;
}

/// [`CharacterStore`] backed by the Postgres repositories.
#[derive(Clone)]
pub struct PgCharacterStore {
    pool: DbPool,
}

impl PgCharacterStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CharacterStore for PgCharacterStore {
    async fn characters_by_owner(&self, owner_id: &str) -> Result<Vec<Character>, sqlx::Error> {
        CharacterRepo::list_by_owner(&self.pool, owner_id).await
    }

    async fn save_characters(&self, batch: &[CharacterRecord]) -> Result<Vec<Character>, sqlx::Error> {
        CharacterRepo::upsert_batch(&self.pool, batch).await
    }

    async fn save_guilds(&self, batch: &[CreateGuild]) -> Result<u64, sqlx::Error> {
        GuildRepo::upsert_batch(&self.pool, batch).await
    }

    async fn clear_guilds(&self, character_ids: &[i64]) -> Result<u64, sqlx::Error> {
        GuildRepo::delete_for_characters(&self.pool, character_ids).await
    }

    async fn set_main(&self, owner_id: &str, name: &str) -> Result<Option<Character>, sqlx::Error> {
        CharacterRepo::set_main(&self.pool, owner_id, name).await
    }

    async fn find_main(&self, owner_id: &str) -> Result<Option<Character>, sqlx::Error> {
        CharacterRepo::find_main(&self.pool, owner_id).await
    }

    async fn character_by_name(&self, name: &str) -> Result<Option<Character>, sqlx::Error> {
        CharacterRepo::find_by_name(&self.pool, name).await
    }

    async fn guild_for_character(&self, character_id: i64) -> Result<Option<Guild>, sqlx::Error> {
        GuildRepo::find_by_character(&self.pool, character_id).await
    }

    async fn guild_by_slug(&self, name_slug: &str) -> Result<Option<Guild>, sqlx::Error> {
        GuildRepo::find_by_slug(&self.pool, name_slug).await
    }
}

impl<T: CharacterStore> CharacterStore for Arc<T> {
    fn characters_by_owner(
        &self,
        owner_id: &str,
    ) -> impl Future<Output = Result<Vec<Character>, sqlx::Error>> + Send {
        (**self).characters_by_owner(owner_id)
    }

    fn save_characters(
        &self,
        batch: &[CharacterRecord],
    ) -> impl Future<Output = Result<Vec<Character>, sqlx::Error>> + Send {
        (**self).save_characters(batch)
    }

    fn save_guilds(
        &self,
        batch: &[CreateGuild],
    ) -> impl Future<Output = Result<u64, sqlx::Error>> + Send {
        (**self).save_guilds(batch)
    }

    fn clear_guilds(
        &self,
        character_ids: &[i64],
    ) -> impl Future<Output = Result<u64, sqlx::Error>> + Send {
        (**self).clear_guilds(character_ids)
    }

    fn set_main(
        &self,
        owner_id: &str,
        name: &str,
    ) -> impl Future<Output = Result<Option<Character>, sqlx::Error>> + Send {
        (**self).set_main(owner_id, name)
    }

    fn find_main(
        &self,
        owner_id: &str,
    ) -> impl Future<Output = Result<Option<Character>, sqlx::Error>> + Send {
        (**self).find_main(owner_id)
    }

    fn character_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Character>, sqlx::Error>> + Send {
        (**self).character_by_name(name)
    }

    fn guild_for_character(
        &self,
        character_id: i64,
    ) -> impl Future<Output = Result<Option<Guild>, sqlx::Error>> + Send {
        (**self).guild_for_character(character_id)
    }

    fn guild_by_slug(
        &self,
        name_slug: &str,
    ) -> impl Future<Output = Result<Option<Guild>, sqlx::Error>> + Send {
        (**self).guild_by_slug(name_slug)
    }
}
