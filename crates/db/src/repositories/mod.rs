//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod character_repo;
pub mod guild_repo;

pub use character_repo::CharacterRepo;
pub use guild_repo::GuildRepo;
