//! Cache-aside orchestration of character rosters.
//!
//! Reads go to the store first and only fall through to Battle.net when the
//! owner has no cached rows at all. Cached rows never expire; a refresh is
//! the only way to replace them.

use std::collections::HashMap;
use std::sync::Arc;

use armory_battlenet::api::BattleNetError;
use armory_battlenet::rate_limit::RateLimiter;
use armory_core::error::{require_non_empty, CoreError};
use armory_core::roster::{CharacterRecord, EnrichedCharacter, Owner};
use armory_db::models::character::Character;
use armory_db::models::guild::{CreateGuild, Guild};
use tokio_util::sync::CancellationToken;

use crate::enrich::{EnrichError, EnrichmentPipeline};
use crate::source::GameApi;
use crate::store::CharacterStore;

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Upstream lookup failed: {0}")]
    Upstream(#[from] BattleNetError),

    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl From<EnrichError> for ProfileError {
    fn from(err: EnrichError) -> Self {
        match err {
            EnrichError::Cancelled => Self::Core(CoreError::Cancelled),
            EnrichError::WorkerFailed(msg) => Self::Core(CoreError::Internal(msg)),
        }
    }
}

/// Answers roster queries from the cache, filling it from Battle.net on a
/// miss.
pub struct ProfileService<A, S> {
    api: Arc<A>,
    store: S,
    pipeline: EnrichmentPipeline<A>,
}

impl<A: GameApi, S: CharacterStore> ProfileService<A, S> {
    pub fn new(api: Arc<A>, store: S, limiter: Arc<RateLimiter>, workers: usize) -> Self {
        let pipeline = EnrichmentPipeline::new(Arc::clone(&api), limiter, workers);
        Self {
            api,
            store,
            pipeline,
        }
    }

    /// The owner's characters, from the cache when it holds any.
    ///
    /// A failed cache read is logged and handled as a miss. On a miss the
    /// roster is fetched, enriched and stored, and the stored rows are
    /// returned best mythic score first.
    pub async fn get_characters(
        &self,
        owner: &Owner,
        access_token: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Character>, ProfileError> {
        require_non_empty("owner_id", &owner.id)?;
        require_non_empty("access_token", access_token)?;

        match self.store.characters_by_owner(&owner.id).await {
            Ok(rows) if !rows.is_empty() => {
                tracing::debug!(owner_id = %owner.id, count = rows.len(), "Character cache hit");
                return Ok(rows);
            }
            Ok(_) => tracing::debug!(owner_id = %owner.id, "Character cache miss"),
            Err(e) => tracing::warn!(
                owner_id = %owner.id,
                error = %e,
                "Character cache read failed, fetching from Battle.net",
            ),
        }

        let mut saved = self.fetch_and_store(owner, access_token, cancel).await?;
        sort_by_score(&mut saved);
        Ok(saved)
    }

    /// Re-fetch the owner's roster from Battle.net regardless of the cache,
    /// store it, and return the owner's rows as stored.
    ///
    /// Rows for characters that left the roster are kept.
    pub async fn refresh_characters(
        &self,
        owner: &Owner,
        access_token: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Character>, ProfileError> {
        require_non_empty("owner_id", &owner.id)?;
        require_non_empty("access_token", access_token)?;

        self.fetch_and_store(owner, access_token, cancel).await?;
        Ok(self.store.characters_by_owner(&owner.id).await?)
    }

    /// Make `name` the owner's main character.
    pub async fn set_main(&self, owner_id: &str, name: &str) -> Result<Character, ProfileError> {
        require_non_empty("owner_id", owner_id)?;
        require_non_empty("character", name)?;

        let main = self
            .store
            .set_main(owner_id, name)
            .await?
            .ok_or_else(|| CoreError::not_found("Character", name))?;

        tracing::info!(owner_id, character = %main.name, "Main character set");
        Ok(main)
    }

    pub async fn main_character(&self, owner_id: &str) -> Result<Character, ProfileError> {
        require_non_empty("owner_id", owner_id)?;

        Ok(self
            .store
            .find_main(owner_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Main character", owner_id))?)
    }

    /// Look a character up by name (any owner) along with its guild.
    pub async fn character_by_name(
        &self,
        name: &str,
    ) -> Result<(Character, Option<Guild>), ProfileError> {
        require_non_empty("name", name)?;

        let character = self
            .store
            .character_by_name(name)
            .await?
            .ok_or_else(|| CoreError::not_found("Character", name))?;
        let guild = self.store.guild_for_character(character.id).await?;
        Ok((character, guild))
    }

    pub async fn guild_by_slug(&self, name_slug: &str) -> Result<Guild, ProfileError> {
        require_non_empty("name_slug", name_slug)?;

        Ok(self
            .store
            .guild_by_slug(name_slug)
            .await?
            .ok_or_else(|| CoreError::not_found("Guild", name_slug))?)
    }

    // ---- private helpers ----

    /// Fetch, enrich and persist the owner's roster.
    ///
    /// Nothing is written unless every step before the write succeeded.
    /// Characters are written first, then guild memberships. Characters
    /// that came back without a guild lose their stored membership. A guild
    /// write failure is returned while the characters stay stored.
    async fn fetch_and_store(
        &self,
        owner: &Owner,
        access_token: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Character>, ProfileError> {
        let roster = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CoreError::Cancelled.into()),
            roster = self.api.fetch_roster(access_token) => roster,
        };
        let roster = roster.inspect_err(|e| {
            tracing::error!(owner_id = %owner.id, error = %e, "Roster fetch failed");
        })?;

        tracing::info!(owner_id = %owner.id, count = roster.len(), "Roster fetched");

        let enriched = self
            .pipeline
            .enrich(roster, access_token, owner, cancel)
            .await?;
        if enriched.is_empty() {
            return Ok(Vec::new());
        }
        if cancel.is_cancelled() {
            return Err(CoreError::Cancelled.into());
        }

        let records: Vec<CharacterRecord> = enriched.iter().map(|c| c.record.clone()).collect();
        let saved = self.store.save_characters(&records).await.inspect_err(|e| {
            tracing::error!(owner_id = %owner.id, error = %e, "Saving characters failed");
        })?;

        let guilds = guild_rows(&enriched, &saved);
        if !guilds.is_empty() {
            self.store.save_guilds(&guilds).await.inspect_err(|e| {
                tracing::error!(
                    owner_id = %owner.id,
                    error = %e,
                    "Saving guilds failed after characters were stored",
                );
            })?;
        }

        let unguilded = unguilded_ids(&saved, &guilds);
        if !unguilded.is_empty() {
            let cleared = self.store.clear_guilds(&unguilded).await.inspect_err(|e| {
                tracing::error!(
                    owner_id = %owner.id,
                    error = %e,
                    "Clearing guilds failed after characters were stored",
                );
            })?;
            if cleared > 0 {
                tracing::debug!(owner_id = %owner.id, cleared, "Stale guild memberships removed");
            }
        }

        tracing::info!(
            owner_id = %owner.id,
            characters = saved.len(),
            guilds = guilds.len(),
            "Character cache filled",
        );
        Ok(saved)
    }
}

/// Pair each enriched guild membership with the stored character's id.
fn guild_rows(enriched: &[EnrichedCharacter], saved: &[Character]) -> Vec<CreateGuild> {
    let ids: HashMap<(&str, &str), i64> = saved
        .iter()
        .map(|c| ((c.name.as_str(), c.realm.as_str()), c.id))
        .collect();

    enriched
        .iter()
        .filter_map(|c| {
            let guild = c.guild.as_ref()?;
            let character_id = *ids.get(&(c.record.name.as_str(), c.record.realm.as_str()))?;
            Some(CreateGuild {
                character_id,
                guild_id: guild.id,
                name: guild.name.clone(),
                name_slug: guild.name_slug(),
                realm: guild.realm.name.clone(),
                realm_slug: guild.realm.slug.clone(),
                faction: guild.faction.clone(),
            })
        })
        .collect()
}

/// Stored characters without a guild in this batch. This includes
/// characters whose detail lookup fell back to defaults, matching the
/// `guild = NULL` just written to their character row.
fn unguilded_ids(saved: &[Character], guilds: &[CreateGuild]) -> Vec<i64> {
    saved
        .iter()
        .map(|c| c.id)
        .filter(|id| !guilds.iter().any(|g| g.character_id == *id))
        .collect()
}

/// Best mythic score first, ties by name.
fn sort_by_score(characters: &mut [Character]) {
    characters.sort_by(|a, b| {
        b.mythic_score
            .total_cmp(&a.mythic_score)
            .then_with(|| a.name.cmp(&b.name))
    });
}
