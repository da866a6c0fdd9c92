use std::sync::Arc;

use armory_battlenet::api::BattleNetApi;
use armory_battlenet::identity::IdentityClient;
use armory_pipeline::{PgCharacterStore, ProfileService};

use crate::config::ServerConfig;

/// The roster service as wired in production.
pub type Profiles = ProfileService<BattleNetApi, PgCharacterStore>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: armory_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Session resolution and Battle.net token exchange.
    pub identity: IdentityClient,
    /// Cache-aside roster aggregation.
    pub profiles: Arc<Profiles>,
}
