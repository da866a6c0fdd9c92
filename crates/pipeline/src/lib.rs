//! Character roster aggregation.
//!
//! - [`source::GameApi`]: the upstream lookups, implemented by
//!   [`armory_battlenet::api::BattleNetApi`].
//! - [`store::CharacterStore`]: the relational cache, implemented by
//!   [`store::PgCharacterStore`].
//! - [`enrich::EnrichmentPipeline`]: per-request worker pool that turns a
//!   roster into merged character records under the shared rate limiter.
//! - [`profile::ProfileService`]: the cache-aside orchestrator the HTTP
//!   layer calls.

pub mod enrich;
pub mod profile;
pub mod source;
pub mod store;

pub use enrich::{EnrichError, EnrichmentPipeline};
pub use profile::{ProfileError, ProfileService};
pub use source::GameApi;
pub use store::{CharacterStore, PgCharacterStore};
