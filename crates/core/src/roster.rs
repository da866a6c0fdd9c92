//! Character roster domain model (PRD: profile aggregation).
//!
//! A roster is the flat list of [`CharacterSummary`] values the game API
//! reports for an account. Each summary is enriched with a
//! [`CharacterDetail`] and a [`MythicScore`], then merged into a
//! [`CharacterRecord`] ready for persistence.

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Spec name used when the detail lookup failed or reported no active spec.
pub const UNKNOWN_SPEC: &str = "Unknown";

// ---------------------------------------------------------------------------
// Ephemeral lookup results
// ---------------------------------------------------------------------------

/// The player identity an aggregation runs on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub id: String,
    pub battletag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Realm {
    pub name: String,
    pub slug: String,
}

/// One entry of the account roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterSummary {
    pub name: String,
    pub level: i32,
    pub realm: Realm,
    pub class: String,
    pub race: String,
    pub faction: String,
}

/// Guild membership as reported by the character detail lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildRef {
    pub id: i64,
    pub name: String,
    pub realm: Realm,
    pub faction: String,
}

impl GuildRef {
    pub fn name_slug(&self) -> String {
        slugify(&self.name)
    }
}

/// Per-character detail lookup.
///
/// [`Default`] is the substitute used when the lookup fails: no spec, no
/// guild, item level 0.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CharacterDetail {
    pub active_spec: Option<String>,
    pub guild: Option<GuildRef>,
    pub average_item_level: i32,
}

/// Mythic+ rating. Always a finite number; a missing profile is `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MythicScore(f64);

impl MythicScore {
    pub fn new(rating: f64) -> Self {
        if rating.is_finite() {
            Self(rating)
        } else {
            Self(0.0)
        }
    }

    pub fn rating(self) -> f64 {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Merged record
// ---------------------------------------------------------------------------

/// A fully merged character, not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterRecord {
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
    pub mythic_score: f64,
    pub is_main: bool,
}

impl CharacterRecord {
    /// Merge a roster entry with its lookups, tagged with the owner.
    pub fn merge(
        owner: &Owner,
        summary: &CharacterSummary,
        detail: &CharacterDetail,
        score: MythicScore,
    ) -> Self {
        let spec = detail
            .active_spec
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(UNKNOWN_SPEC)
            .to_string();

        Self {
            owner_id: owner.id.clone(),
            battletag: owner.battletag.clone(),
            name: summary.name.clone(),
            realm: summary.realm.name.clone(),
            race: summary.race.clone(),
            faction: summary.faction.clone(),
            class: summary.class.clone(),
            spec,
            level: summary.level,
            item_level: detail.average_item_level,
            guild: detail.guild.as_ref().map(|g| g.name.clone()),
            mythic_score: score.rating(),
            is_main: false,
        }
    }
}

/// Output of the enrichment pipeline for one roster entry.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedCharacter {
    pub record: CharacterRecord,
    pub guild: Option<GuildRef>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Lower-case `name` and join its whitespace-separated words with `-`.
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
