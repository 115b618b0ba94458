//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Sign-in, sign-up, Google sign-in and identity events
//! - `blog` - Cached article listing and lookup
//! - `whatsapp` - Pre-filled `wa.me` links for orders and quotes

pub mod auth;
pub mod blog;
pub mod whatsapp;
