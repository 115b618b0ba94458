//! M² Verse Core - Shared types library.
//!
//! This crate provides common types used by the M² Verse storefront:
//! validated email addresses and type-safe identifiers for catalog items,
//! carts, platform users, and blog articles.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
