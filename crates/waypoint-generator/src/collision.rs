use crate::normalize::NormalizeOutcome;
use crate::Generator;
use std::collections::HashSet;
use tracing::{debug, warn};
use typed_builder::TypedBuilder;
use waypoint_core::constants::MAX_COLLISION_ATTEMPTS;
use waypoint_core::ShortCode;

/// Configures a [`CollisionGuard`].
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct GuardSettings {
    /// Re-encoding attempts per URL before a collision is accepted.
    #[builder(default = MAX_COLLISION_ATTEMPTS)]
    pub max_attempts: usize,
}

impl Default for GuardSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A code assigned to one URL of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assigned {
    pub code: ShortCode,
    /// Number of re-encodings needed, 0 when the first code was free.
    pub attempts: usize,
    /// Every attempt collided and the last code was accepted anyway.
    pub collision_unresolved: bool,
    pub normalization: NormalizeOutcome,
}

impl Assigned {
    /// True when the code is not a clean, unique encoding of its URL.
    pub fn is_degraded(&self) -> bool {
        self.collision_unresolved || self.normalization == NormalizeOutcome::Degraded
    }
}

/// Assigns pairwise distinct codes to the URLs of one batch.
///
/// When a code is already taken the URL is re-encoded through
/// [`Generator::generate_attempt`] with the attempt index. After
/// `max_attempts` the colliding code is accepted and flagged rather than
/// failing the batch.
///
/// URLs are processed in order and every accepted code is visible to the
/// next URL. A guard keeps no state between calls to [`assign`](Self::assign).
#[derive(Debug, Clone)]
pub struct CollisionGuard<G> {
    generator: G,
    settings: GuardSettings,
}

impl<G: Generator> CollisionGuard<G> {
    pub fn new(generator: G, settings: GuardSettings) -> Self {
        Self {
            generator,
            settings,
        }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Assigns one code per URL, in input order.
    pub fn assign<I, S>(&self, urls: I) -> Vec<Assigned>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut used = HashSet::new();

        urls.into_iter()
            .map(|url| {
                let url = url.as_ref();
                let mut encoded = self.generator.generate(url);

                let mut attempt = 0;
                while used.contains(&encoded.code) && attempt < self.settings.max_attempts {
                    debug!(
                        url = %url,
                        code = %encoded.code,
                        attempt,
                        "short code collision, re-encoding"
                    );
                    encoded = self.generator.generate_attempt(url, attempt);
                    attempt += 1;
                }

                let collision_unresolved = used.contains(&encoded.code);
                if collision_unresolved {
                    warn!(
                        url = %url,
                        code = %encoded.code,
                        attempts = attempt,
                        "collision unresolved, accepting duplicate short code"
                    );
                }

                used.insert(encoded.code.clone());

                Assigned {
                    code: encoded.code,
                    attempts: attempt,
                    collision_unresolved,
                    normalization: encoded.normalization,
                }
            })
            .collect()
    }
}
