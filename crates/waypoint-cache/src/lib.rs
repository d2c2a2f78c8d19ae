//! In-process caches shared across Waypoint services.

pub mod clock;
pub mod ttl;

pub use clock::{Clock, SystemClock};
pub use ttl::TtlCache;
