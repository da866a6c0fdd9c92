//! Upstream game-data lookups used by the aggregation.

use std::future::Future;

use armory_battlenet::api::{BattleNetApi, BattleNetError};
use armory_core::roster::{CharacterDetail, CharacterSummary, MythicScore};

/// The three Battle.net lookups the aggregation depends on.
///
/// Implementations must be shareable across worker tasks.
pub trait GameApi: Send + Sync + 'static {
    /// The flat roster of the account behind `access_token`.
    fn fetch_roster(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<Vec<CharacterSummary>, BattleNetError>> + Send;

    fn fetch_detail(
        &self,
        access_token: &str,
        realm_slug: &str,
        name: &str,
    ) -> impl Future<Output = Result<CharacterDetail, BattleNetError>> + Send;

    /// `Ok(None)` when the character has no keystone profile.
    fn fetch_mythic_score(
        &self,
        access_token: &str,
        realm_slug: &str,
        name: &str,
    ) -> impl Future<Output = Result<Option<MythicScore>, BattleNetError>> + Send;
}

impl GameApi for BattleNetApi {
    async fn fetch_roster(&self, access_token: &str) -> Result<Vec<CharacterSummary>, BattleNetError> {
        self.list_roster(access_token).await
    }

    async fn fetch_detail(
        &self,
        access_token: &str,
        realm_slug: &str,
        name: &str,
    ) -> Result<CharacterDetail, BattleNetError> {
        self.character_detail(access_token, realm_slug, name).await
    }

    async fn fetch_mythic_score(
        &self,
        access_token: &str,
        realm_slug: &str,
        name: &str,
    ) -> Result<Option<MythicScore>, BattleNetError> {
        self.mythic_score(access_token, realm_slug, name).await
    }
}
