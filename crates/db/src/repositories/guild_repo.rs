//! Repository for the `guilds` table.

use sqlx::PgPool;

use crate::models::guild::{CreateGuild, Guild};

const COLUMNS: &str =
    "character_id, guild_id, name, name_slug, realm, realm_slug, faction, created_at, updated_at";

pub struct GuildRepo;

impl GuildRepo {
    /// Insert or update guild memberships in a single statement, keyed on
    /// `character_id`. Returns the number of rows written.
    ///
    /// This runs outside the character upsert's statement, so a failure
    /// here leaves the freshly written characters in place.
    pub async fn upsert_batch(pool: &PgPool, guilds: &[CreateGuild]) -> Result<u64, sqlx::Error> {
        if guilds.is_empty() {
            return Ok(0);
        }

        let character_ids: Vec<i64> = guilds.iter().map(|g| g.character_id).collect();
        let guild_ids: Vec<i64> = guilds.iter().map(|g| g.guild_id).collect();
        let names: Vec<String> = guilds.iter().map(|g| g.name.clone()).collect();
        let slugs: Vec<String> = guilds.iter().map(|g| g.name_slug.clone()).collect();
        let realms: Vec<String> = guilds.iter().map(|g| g.realm.clone()).collect();
        let realm_slugs: Vec<String> = guilds.iter().map(|g| g.realm_slug.clone()).collect();
        let factions: Vec<String> = guilds.iter().map(|g| g.faction.clone()).collect();

        let result = sqlx::query(
            "INSERT INTO guilds \
                (character_id, guild_id, name, name_slug, realm, realm_slug, faction) \
             SELECT * FROM UNNEST( \
                $1::bigint[], $2::bigint[], $3::text[], $4::text[], $5::text[], \
                $6::text[], $7::text[]) \
             ON CONFLICT (character_id) DO UPDATE SET \
                guild_id = EXCLUDED.guild_id, \
                name = EXCLUDED.name, \
                name_slug = EXCLUDED.name_slug, \
                realm = EXCLUDED.realm, \
                realm_slug = EXCLUDED.realm_slug, \
                faction = EXCLUDED.faction, \
                updated_at = NOW()",
        )
        .bind(&character_ids)
        .bind(&guild_ids)
        .bind(&names)
        .bind(&slugs)
        .bind(&realms)
        .bind(&realm_slugs)
        .bind(&factions)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Drop the guild rows of characters that no longer belong to a guild.
    /// Returns the number of rows deleted.
    pub async fn delete_for_characters(
        pool: &PgPool,
        character_ids: &[i64],
    ) -> Result<u64, sqlx::Error> {
        if character_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM guilds WHERE character_id = ANY($1::bigint[])")
            .bind(character_ids)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Find a guild by its name slug. Several characters can share a guild;
    /// any one of their rows describes it.
    pub async fn find_by_slug(pool: &PgPool, name_slug: &str) -> Result<Option<Guild>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM guilds \
             WHERE name_slug = $1 \
             ORDER BY character_id \
             LIMIT 1"
        );
        sqlx::query_as::<_, Guild>(&query)
            .bind(name_slug)
            .fetch_optional(pool)
            .await
    }

    /// Find the guild row attached to a character.
    pub async fn find_by_character(
        pool: &PgPool,
        character_id: i64,
    ) -> Result<Option<Guild>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM guilds WHERE character_id = $1");
        sqlx::query_as::<_, Guild>(&query)
            .bind(character_id)
            .fetch_optional(pool)
            .await
    }
}
