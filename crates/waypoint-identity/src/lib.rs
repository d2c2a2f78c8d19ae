//! Account identity resolution and endpoint selection.
//!
//! An account identifier (a DID) is resolved to the base URL of its PDS
//! through [`IdentityResolver`]. [`AgentManager`] caches the resulting
//! [`ServiceClient`] and falls back to the public endpoint when the PDS is
//! unknown or failing.
//!
//! All network access goes through the [`Fetch`] trait.

pub mod client;
pub mod error;
pub mod fetch;
pub mod manager;
pub mod resolver;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::{Profile, Record, ServiceClient};
pub use error::{IdentityError, Result};
pub use fetch::{Fetch, FetchRequest, FetchResponse, HttpFetch, Method};
pub use manager::{AgentManager, IdentitySettings};
pub use resolver::{IdentityResolver, ResolvedIdentity};
