//! Repository for the `characters` table.

use std::collections::HashMap;

use armory_core::roster::CharacterRecord;
use sqlx::PgPool;

use crate::models::character::Character;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_id, battletag, name, realm, race, faction, class, spec, \
     level, item_level, guild, mythic_score, is_main, created_at, updated_at";

/// Provides the cache read/write operations for characters.
pub struct CharacterRepo;

impl CharacterRepo {
    /// Insert or update a batch of characters in a single statement.
    ///
    /// Rows are keyed on `(owner_id, name, realm)`. On conflict every
    /// mutable column is overwritten from the incoming record except
    /// `is_main`, which keeps its stored value so a refresh never clears a
    /// chosen main character. New rows take `is_main` from the record.
    ///
    /// Returns the stored rows (in no particular order).
    pub async fn upsert_batch(
        pool: &PgPool,
        records: &[CharacterRecord],
    ) -> Result<Vec<Character>, sqlx::Error> {
        if records.is_empty() {
            return Ok(vec![]);
        }

        // Postgres rejects an upsert that touches the same key twice in one
        // statement; the last occurrence wins.
        let mut by_key: HashMap<(&str, &str, &str), &CharacterRecord> = HashMap::new();
        let mut order = Vec::with_capacity(records.len());
        for record in records {
            let key = (
                record.owner_id.as_str(),
                record.name.as_str(),
                record.realm.as_str(),
            );
            if by_key.insert(key, record).is_none() {
                order.push(key);
            }
        }
        let unique: Vec<&CharacterRecord> = order.iter().map(|k| by_key[k]).collect();

        let owner_ids: Vec<String> = unique.iter().map(|r| r.owner_id.clone()).collect();
        let battletags: Vec<String> = unique.iter().map(|r| r.battletag.clone()).collect();
        let names: Vec<String> = unique.iter().map(|r| r.name.clone()).collect();
        let realms: Vec<String> = unique.iter().map(|r| r.realm.clone()).collect();
        let races: Vec<String> = unique.iter().map(|r| r.race.clone()).collect();
        let factions: Vec<String> = unique.iter().map(|r| r.faction.clone()).collect();
        let classes: Vec<String> = unique.iter().map(|r| r.class.clone()).collect();
        let specs: Vec<String> = unique.iter().map(|r| r.spec.clone()).collect();
        let levels: Vec<i32> = unique.iter().map(|r| r.level).collect();
        let item_levels: Vec<i32> = unique.iter().map(|r| r.item_level).collect();
        let guilds: Vec<Option<String>> = unique.iter().map(|r| r.guild.clone()).collect();
        let scores: Vec<f64> = unique.iter().map(|r| r.mythic_score).collect();
        let mains: Vec<bool> = unique.iter().map(|r| r.is_main).collect();

        let query = format!(
            "INSERT INTO characters \
                (owner_id, battletag, name, realm, race, faction, class, spec, \
                 level, item_level, guild, mythic_score, is_main) \
             SELECT * FROM UNNEST( \
                $1::text[], $2::text[], $3::text[], $4::text[], $5::text[], $6::text[], \
                $7::text[], $8::text[], $9::int4[], $10::int4[], $11::text[], \
                $12::float8[], $13::bool[]) \
             ON CONFLICT (owner_id, name, realm) DO UPDATE SET \
                battletag = EXCLUDED.battletag, \
                race = EXCLUDED.race, \
                faction = EXCLUDED.faction, \
                class = EXCLUDED.class, \
                spec = EXCLUDED.spec, \
                level = EXCLUDED.level, \
                item_level = EXCLUDED.item_level, \
                guild = EXCLUDED.guild, \
                mythic_score = EXCLUDED.mythic_score, \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        let rows = sqlx::query_as::<_, Character>(&query)
            .bind(&owner_ids)
            .bind(&battletags)
            .bind(&names)
            .bind(&realms)
            .bind(&races)
            .bind(&factions)
            .bind(&classes)
            .bind(&specs)
            .bind(&levels)
            .bind(&item_levels)
            .bind(&guilds)
            .bind(&scores)
            .bind(&mains)
            .fetch_all(pool)
            .await?;

        tracing::debug!(count = rows.len(), "Upserted characters");
        Ok(rows)
    }

    /// List all characters for an owner, best mythic score first.
    ///
    /// The ordering is part of the contract: callers display the first row
    /// as the strongest character.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: &str,
    ) -> Result<Vec<Character>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM characters \
             WHERE owner_id = $1 \
             ORDER BY mythic_score DESC, name ASC"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Find a character by name, case-insensitively.
    ///
    /// Names are only unique per realm; on a collision the row with the
    /// highest mythic score is returned.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Character>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM characters \
             WHERE lower(name) = lower($1) \
             ORDER BY mythic_score DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Find the owner's main character, if one is set.
    pub async fn find_main(pool: &PgPool, owner_id: &str) -> Result<Option<Character>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM characters \
             WHERE owner_id = $1 AND is_main = true \
             LIMIT 1"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// Mark a character as the owner's main, un-marking every other row of
    /// the same owner. Both updates run in one transaction.
    ///
    /// Returns `None` (and leaves every row untouched) if the owner has no
    /// character with that name.
    pub async fn set_main(
        pool: &PgPool,
        owner_id: &str,
        name: &str,
    ) -> Result<Option<Character>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "UPDATE characters SET is_main = false, updated_at = NOW() \
             WHERE owner_id = $1 AND is_main = true",
        )
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE characters SET is_main = true, updated_at = NOW() \
             WHERE id = ( \
                SELECT id FROM characters \
                WHERE owner_id = $1 AND lower(name) = lower($2) \
                ORDER BY mythic_score DESC \
                LIMIT 1) \
             RETURNING {COLUMNS}"
        );
        let result = sqlx::query_as::<_, Character>(&query)
            .bind(owner_id)
            .bind(name)
            .fetch_optional(&mut *tx)
            .await?;

        match result {
            Some(character) => {
                tx.commit().await?;
                Ok(Some(character))
            }
            None => {
                tx.rollback().await?;
                Ok(None)
            }
        }
    }
}
