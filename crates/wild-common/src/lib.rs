//! # wild-common
//!
//! Shared types, configuration, error handling, and utilities used across all
//! Wildthoughts crates. No I/O lives here: models, validation, slug derivation,
//! sort resolution, vote transitions and page arithmetic.

pub mod config;
pub mod error;
pub mod models;
pub mod pagination;
pub mod slug;
pub mod sorting;
pub mod validation;
pub mod voting;
