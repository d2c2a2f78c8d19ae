//! Core types for the Waypoint link shortener.
//!
//! This crate provides the hash primitive, the base-N alphabet encoder, the
//! validated [`ShortCode`] type and the link record types shared by the
//! generator, the link service and the gateway.

pub mod alphabet;
pub mod constants;
pub mod error;
pub mod hash;
pub mod link;
pub mod shortcode;

pub use alphabet::Alphabet;
pub use error::{CoreError, Result};
pub use hash::{hash, hash_with_seed, Fnv1a};
pub use link::{LinkBoard, LinkCard, LinkRecord};
pub use shortcode::ShortCode;
