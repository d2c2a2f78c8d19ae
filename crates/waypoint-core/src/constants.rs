//! Default configuration values.
//!
//! These are the values the gateway falls back to when nothing else is
//! configured. Library types take them through their settings builders and
//! never read the environment themselves.

use std::time::Duration;

/// Symbols used for generated short codes: digits, lower case, upper case.
pub const BASE62_SYMBOLS: &str = "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of generated short codes.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Shortest length the encoder accepts before falling back to the default.
pub const MIN_CODE_LENGTH: usize = 3;

/// Longest code the encoder produces; longer requests are clamped.
pub const MAX_CODE_LENGTH: usize = 64;

/// Number of leading symbols derived from the apex domain.
pub const DOMAIN_PREFIX_LENGTH: usize = 2;

/// Re-encoding attempts before a collision inside a batch is accepted.
pub const MAX_COLLISION_ATTEMPTS: usize = 20;

/// Lifetime of cached link boards.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Cache key prefix for link boards.
pub const LINKAT_CACHE_PREFIX: &str = "linkat:";

/// Identity resolver used to find an account's PDS.
pub const RESOLVER_ENDPOINT: &str = "https://slingshot.microcosm.blue";

/// Public AppView used when the PDS cannot be resolved.
pub const PUBLIC_API_ENDPOINT: &str = "https://public.api.bsky.app";

/// Collection holding the link board record.
pub const LINKAT_COLLECTION: &str = "blue.linkat.board";

/// Record key of the link board.
pub const LINKAT_RKEY: &str = "self";
