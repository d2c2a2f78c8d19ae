//! Deterministic short code generation.
//!
//! [`ShortcodeEncoder`] derives a fixed-length code from a URL, and
//! [`CollisionGuard`] keeps the codes of one batch pairwise distinct.

pub mod collision;
pub mod encoder;
pub mod normalize;

pub use collision::{Assigned, CollisionGuard, GuardSettings};
pub use encoder::{Encoded, EncoderSettings, ShortcodeEncoder};
pub use normalize::{base_domain, hostname, normalize, NormalizeOutcome, Normalized};

/// Trait for deriving short codes from an input string.
///
/// Implementations are pure: the same input always yields the same code, and
/// they don't interact with storage. Uniqueness is the caller's concern, see
/// [`CollisionGuard`].
pub trait Generator: Send + Sync + 'static {
    /// Derives a code for `input`.
    fn generate(&self, input: &str) -> Encoded;

    /// Derives the code for retry number `attempt` after `input` collided.
    ///
    /// Must differ from [`generate`](Self::generate) for the same input.
    /// The default appends the attempt index to the input.
    fn generate_attempt(&self, input: &str, attempt: usize) -> Encoded {
        self.generate(&format!("{}{}", input, attempt))
    }
}
