//! Row structs and insert DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus the DTO used for batch upserts where one exists.

pub mod character;
pub mod guild;
