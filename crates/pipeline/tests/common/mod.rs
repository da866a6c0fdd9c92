//! In-memory fakes for the game API and the character store.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use armory_battlenet::api::BattleNetError;
use armory_battlenet::config::RateLimitConfig;
use armory_battlenet::rate_limit::RateLimiter;
use armory_core::roster::{
    CharacterDetail, CharacterRecord, CharacterSummary, GuildRef, MythicScore, Owner, Realm,
};
use armory_db::models::character::Character;
use armory_db::models::guild::{CreateGuild, Guild};
use armory_pipeline::{CharacterStore, GameApi};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub const TOKEN: &str = "bnet-token";

pub fn owner() -> Owner {
    Owner {
        id: "owner-1".to_string(),
        battletag: "Player#1234".to_string(),
    }
}

pub fn summary(name: &str, realm_slug: &str) -> CharacterSummary {
    CharacterSummary {
        name: name.to_string(),
        level: 80,
        realm: Realm {
            name: realm_slug.to_string(),
            slug: realm_slug.to_string(),
        },
        class: "Warrior".to_string(),
        race: "Orc".to_string(),
        faction: "Horde".to_string(),
    }
}

pub fn roster(n: usize) -> Vec<CharacterSummary> {
    (0..n).map(|i| summary(&format!("Char{i}"), "draenor")).collect()
}

/// A limiter that never makes tests wait.
pub fn open_limiter() -> Arc<RateLimiter> {
    Arc::new(RateLimiter::new(&RateLimitConfig {
        per_second: 10_000,
        burst: 10_000,
        max_wait: Duration::from_secs(5),
    }))
}

// ---------------------------------------------------------------------------
// Game API
// ---------------------------------------------------------------------------

/// Scriptable [`GameApi`] with call counters.
#[derive(Default)]
pub struct FakeGameApi {
    pub roster: Vec<CharacterSummary>,
    /// When set, the roster call fails with this HTTP status.
    pub roster_status: Option<u16>,
    /// Names whose detail lookup fails.
    pub failing_details: HashSet<String>,
    /// Names whose score lookup fails (as opposed to being absent).
    pub failing_scores: HashSet<String>,
    /// Ratings by name; names not listed have no keystone profile.
    pub scores: HashMap<String, f64>,
    /// Guild reported for a name by the detail lookup.
    pub guilds: HashMap<String, String>,
    /// Added latency on every per-character lookup.
    pub delay: Duration,
    /// The detail lookup for this name panics.
    pub panic_on: Option<String>,

    pub roster_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
    pub score_calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeGameApi {
    pub fn with_roster(roster: Vec<CharacterSummary>) -> Self {
        Self {
            roster,
            ..Self::default()
        }
    }

    pub fn roster_calls(&self) -> usize {
        self.roster_calls.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

fn upstream_error(status: u16) -> BattleNetError {
    BattleNetError::ApiError {
        status,
        body: "fake upstream failure".to_string(),
    }
}

impl GameApi for FakeGameApi {
    async fn fetch_roster(&self, _access_token: &str) -> Result<Vec<CharacterSummary>, BattleNetError> {
        self.roster_calls.fetch_add(1, Ordering::SeqCst);
        match self.roster_status {
            Some(status) => Err(upstream_error(status)),
            None => Ok(self.roster.clone()),
        }
    }

    async fn fetch_detail(
        &self,
        _access_token: &str,
        realm_slug: &str,
        name: &str,
    ) -> Result<CharacterDetail, BattleNetError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_on.as_deref() == Some(name) {
            panic!("detail lookup exploded for {name}");
        }
        self.simulate_latency().await;

        if self.failing_details.contains(name) {
            return Err(upstream_error(500));
        }
        Ok(CharacterDetail {
            active_spec: Some("Arms".to_string()),
            guild: self.guilds.get(name).map(|guild| GuildRef {
                id: 1,
                name: guild.clone(),
                realm: Realm {
                    name: realm_slug.to_string(),
                    slug: realm_slug.to_string(),
                },
                faction: "Horde".to_string(),
            }),
            average_item_level: 600,
        })
    }

    async fn fetch_mythic_score(
        &self,
        _access_token: &str,
        _realm_slug: &str,
        name: &str,
    ) -> Result<Option<MythicScore>, BattleNetError> {
        self.score_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if self.failing_scores.contains(name) {
            return Err(upstream_error(503));
        }
        Ok(self.scores.get(name).map(|&rating| MythicScore::new(rating)))
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Tables {
    characters: Vec<Character>,
    guilds: Vec<Guild>,
    next_id: i64,
}

/// [`CharacterStore`] over in-memory tables with the Postgres upsert rules.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    pub fail_reads: bool,
    pub fail_guild_writes: bool,
    pub read_calls: AtomicUsize,
    pub write_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub fn failing_guild_writes() -> Self {
        Self {
            fail_guild_writes: true,
            ..Self::default()
        }
    }

    pub fn rows(&self) -> Vec<Character> {
        self.tables.lock().unwrap().characters.clone()
    }

    pub fn guild_rows(&self) -> Vec<Guild> {
        self.tables.lock().unwrap().guilds.clone()
    }

    pub fn seed(&self, records: &[CharacterRecord]) {
        let mut tables = self.tables.lock().unwrap();
        for record in records {
            upsert(&mut tables, record);
        }
    }
}

fn upsert(tables: &mut Tables, record: &CharacterRecord) -> Character {
    let now = chrono::Utc::now();
    if let Some(row) = tables.characters.iter_mut().find(|c| {
        c.owner_id == record.owner_id && c.name == record.name && c.realm == record.realm
    }) {
        row.battletag = record.battletag.clone();
        row.race = record.race.clone();
        row.faction = record.faction.clone();
        row.class = record.class.clone();
        row.spec = record.spec.clone();
        row.level = record.level;
        row.item_level = record.item_level;
        row.guild = record.guild.clone();
        row.mythic_score = record.mythic_score;
        row.updated_at = now;
        return row.clone();
    }

    tables.next_id += 1;
    let row = Character {
        id: tables.next_id,
        owner_id: record.owner_id.clone(),
        battletag: record.battletag.clone(),
        name: record.name.clone(),
        realm: record.realm.clone(),
        race: record.race.clone(),
        faction: record.faction.clone(),
        class: record.class.clone(),
        spec: record.spec.clone(),
        level: record.level,
        item_level: record.item_level,
        guild: record.guild.clone(),
        mythic_score: record.mythic_score,
        is_main: record.is_main,
        created_at: now,
        updated_at: now,
    };
    tables.characters.push(row.clone());
    row
}

fn sql_error(message: &str) -> sqlx::Error {
    sqlx::Error::Protocol(message.to_string())
}

impl CharacterStore for MemoryStore {
    async fn characters_by_owner(&self, owner_id: &str) -> Result<Vec<Character>, sqlx::Error> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads {
            return Err(sql_error("read failed"));
        }
        let mut rows: Vec<Character> = self
            .tables
            .lock()
            .unwrap()
            .characters
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.mythic_score
                .total_cmp(&a.mythic_score)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(rows)
    }

    async fn save_characters(&self, batch: &[CharacterRecord]) -> Result<Vec<Character>, sqlx::Error> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        let mut tables = self.tables.lock().unwrap();
        Ok(batch.iter().map(|r| upsert(&mut tables, r)).collect())
    }

    async fn save_guilds(&self, batch: &[CreateGuild]) -> Result<u64, sqlx::Error> {
        if self.fail_guild_writes {
            return Err(sql_error("guild write failed"));
        }
        let now = chrono::Utc::now();
        let mut tables = self.tables.lock().unwrap();
        for guild in batch {
            tables.guilds.retain(|g| g.character_id != guild.character_id);
            tables.guilds.push(Guild {
                character_id: guild.character_id,
                guild_id: guild.guild_id,
                name: guild.name.clone(),
                name_slug: guild.name_slug.clone(),
                realm: guild.realm.clone(),
                realm_slug: guild.realm_slug.clone(),
                faction: guild.faction.clone(),
                created_at: now,
                updated_at: now,
            });
        }
        Ok(batch.len() as u64)
    }

    async fn clear_guilds(&self, character_ids: &[i64]) -> Result<u64, sqlx::Error> {
        if self.fail_guild_writes {
            return Err(sql_error("guild write failed"));
        }
        let mut tables = self.tables.lock().unwrap();
        let before = tables.guilds.len();
        tables.guilds.retain(|g| !character_ids.contains(&g.character_id));
        Ok((before - tables.guilds.len()) as u64)
    }

    async fn set_main(&self, owner_id: &str, name: &str) -> Result<Option<Character>, sqlx::Error> {
        let mut tables = self.tables.lock().unwrap();
        let target = tables
            .characters
            .iter()
            .position(|c| c.owner_id == owner_id && c.name.eq_ignore_ascii_case(name));
        let Some(target) = target else {
            return Ok(None);
        };
        for row in tables.characters.iter_mut().filter(|c| c.owner_id == owner_id) {
            row.is_main = false;
        }
        tables.characters[target].is_main = true;
        Ok(Some(tables.characters[target].clone()))
    }

    async fn find_main(&self, owner_id: &str) -> Result<Option<Character>, sqlx::Error> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .characters
            .iter()
            .find(|c| c.owner_id == owner_id && c.is_main)
            .cloned())
    }

    async fn character_by_name(&self, name: &str) -> Result<Option<Character>, sqlx::Error> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .characters
            .iter()
            .filter(|c| c.name.eq_ignore_ascii_case(name))
            .max_by(|a, b| a.mythic_score.total_cmp(&b.mythic_score))
            .cloned())
    }

    async fn guild_for_character(&self, character_id: i64) -> Result<Option<Guild>, sqlx::Error> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .guilds
            .iter()
            .find(|g| g.character_id == character_id)
            .cloned())
    }

    async fn guild_by_slug(&self, name_slug: &str) -> Result<Option<Guild>, sqlx::Error> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.guilds.iter().find(|g| g.name_slug == name_slug).cloned())
    }
}
