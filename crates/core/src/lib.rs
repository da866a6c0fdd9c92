//! Domain types shared by every Armory crate.
//!
//! Kept free of I/O: the Battle.net client, the database layer and the
//! enrichment pipeline all depend on this crate, never the other way round.

pub mod error;
pub mod roster;
pub mod types;
