//! Deterministic, non-cryptographic string hashing.
//!
//! Short codes are derived from FNV-1a (64-bit) digests. The digest is stable
//! across processes and platforms, so a URL always maps to the same code.
//! It offers no resistance against adversarial collisions.

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Separates an absorbed seed from the hashed text. Never produced by UTF-8.
const SEED_SEPARATOR: u8 = 0xff;

/// A streaming FNV-1a hasher.
#[derive(Debug, Clone, Copy)]
pub struct Fnv1a {
    state: u64,
}

impl Fnv1a {
    pub fn new() -> Self {
        Self {
            state: FNV_OFFSET_BASIS,
        }
    }

    /// Creates a hasher that has already absorbed `seed`.
    pub fn with_seed(seed: &str) -> Self {
        let mut hasher = Self::new();
        hasher.write(seed.as_bytes());
        hasher.write(&[SEED_SEPARATOR]);
        hasher
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.state ^= u64::from(*byte);
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }

    pub fn write_str(&mut self, text: &str) -> &mut Self {
        self.write(text.as_bytes());
        self
    }

    pub fn finish(&self) -> u64 {
        self.state
    }
}

impl Default for Fnv1a {
    fn default() -> Self {
        Self::new()
    }
}

/// Hashes `text` with FNV-1a.
pub fn hash(text: &str) -> u64 {
    Fnv1a::new().write_str(text).finish()
}

/// Hashes `text` after absorbing `seed`.
///
/// Different seeds give unrelated digests for the same text.
pub fn hash_with_seed(text: &str, seed: &str) -> u64 {
    Fnv1a::with_seed(seed).write_str(text).finish()
}
