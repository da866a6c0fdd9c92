//! Wire formats of the Battle.net profile API.
//!
//! Only the fields the roster aggregation reads are modelled; everything
//! else in the payloads is ignored. Each DTO converts into its
//! `armory_core::roster` counterpart.

use armory_core::roster::{CharacterDetail, CharacterSummary, GuildRef, MythicScore, Realm};
use serde::Deserialize;

/// `GET /profile/user/wow`
#[derive(Debug, Deserialize)]
pub struct AccountProfileResponse {
    #[serde(default)]
    pub wow_accounts: Vec<WowAccount>,
}

impl AccountProfileResponse {
    /// Flatten every account's characters into one roster, in order.
    pub fn into_roster(self) -> Vec<CharacterSummary> {
        self.wow_accounts
            .into_iter()
            .flat_map(|account| account.characters)
            .map(CharacterSummary::from)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct WowAccount {
    #[serde(default)]
    pub characters: Vec<CharacterSummaryDto>,
}

#[derive(Debug, Deserialize)]
pub struct CharacterSummaryDto {
    pub name: String,
    #[serde(default)]
    pub level: i32,
    pub realm: RealmDto,
    #[serde(default)]
    pub playable_class: NamedRef,
    #[serde(default)]
    pub playable_race: NamedRef,
    #[serde(default)]
    pub faction: NamedRef,
}

impl From<CharacterSummaryDto> for CharacterSummary {
    fn from(dto: CharacterSummaryDto) -> Self {
        Self {
            name: dto.name,
            level: dto.level,
            realm: dto.realm.into(),
            class: dto.playable_class.name,
            race: dto.playable_race.name,
            faction: dto.faction.name,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RealmDto {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

impl From<RealmDto> for Realm {
    fn from(dto: RealmDto) -> Self {
        Self {
            name: dto.name,
            slug: dto.slug,
        }
    }
}

/// Any `{ "name": ... }` reference (class, race, faction, spec).
#[derive(Debug, Default, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub name: String,
}

/// `GET /profile/wow/character/{realm}/{name}`
#[derive(Debug, Deserialize)]
pub struct CharacterDetailResponse {
    pub active_spec: Option<NamedRef>,
    pub guild: Option<GuildDto>,
    #[serde(default)]
    pub average_item_level: i32,
}

impl From<CharacterDetailResponse> for CharacterDetail {
    fn from(dto: CharacterDetailResponse) -> Self {
        Self {
            active_spec: dto
                .active_spec
                .map(|spec| spec.name)
                .filter(|name| !name.is_empty()),
            guild: dto.guild.map(GuildRef::from),
            average_item_level: dto.average_item_level,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GuildDto {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub realm: RealmDto,
    #[serde(default)]
    pub faction: NamedRef,
}

impl From<GuildDto> for GuildRef {
    fn from(dto: GuildDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            realm: dto.realm.into(),
            faction: dto.faction.name,
        }
    }
}

/// `GET /profile/wow/character/{realm}/{name}/mythic-keystone-profile`
#[derive(Debug, Deserialize)]
pub struct MythicProfileResponse {
    pub current_mythic_rating: Option<RatingDto>,
}

#[derive(Debug, Deserialize)]
pub struct RatingDto {
    pub rating: f64,
}

impl From<MythicProfileResponse> for MythicScore {
    fn from(dto: MythicProfileResponse) -> Self {
        dto.current_mythic_rating
            .map(|r| MythicScore::new(r.rating))
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
