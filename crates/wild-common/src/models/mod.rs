//! Core domain models shared across all Wildthoughts crates.
//!
//! These are the "truth" types: what the database stores and the API
//! serializes. Rows carry joined display fields (author username, animal
//! name) so handlers never need a second round-trip to render them.

pub mod animal;
pub mod comment;
pub mod discussion;
pub mod petition;
pub mod profile;
pub mod seed;
pub mod user_list;

/// Re-export all model types for convenience.
pub use animal::*;
pub use comment::*;
pub use discussion::*;
pub use petition::*;
pub use profile::*;
pub use seed::*;
pub use user_list::*;
