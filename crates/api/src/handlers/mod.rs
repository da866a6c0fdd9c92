pub mod lookup;
pub mod profile;
