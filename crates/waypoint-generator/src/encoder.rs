use crate::normalize::{base_domain, hostname, normalize, NormalizeOutcome};
use crate::Generator;
use tracing::{debug, trace};
use typed_builder::TypedBuilder;
use waypoint_core::constants::{
    DEFAULT_CODE_LENGTH, DOMAIN_PREFIX_LENGTH, MAX_CODE_LENGTH, MIN_CODE_LENGTH,
};
use waypoint_core::{hash, Alphabet, ShortCode};

/// Configures a [`ShortcodeEncoder`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct EncoderSettings {
    /// Symbols codes are written in.
    #[builder(default)]
    pub alphabet: Alphabet,
    /// Length used when the requested one is too short.
    #[builder(default = DEFAULT_CODE_LENGTH)]
    pub default_length: usize,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// The result of encoding one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub code: ShortCode,
    /// Whether the URL was canonicalised or used raw.
    pub normalization: NormalizeOutcome,
    /// The requested length was out of range and was replaced.
    pub length_coerced: bool,
}

impl Encoded {
    /// True when the code was derived from the raw, unparsed input.
    pub fn is_degraded(&self) -> bool {
        self.normalization == NormalizeOutcome::Degraded
    }
}

/// Derives fixed-length short codes from the structure of a URL.
///
/// A code is laid out as
///
/// ```text
/// [ domain prefix | url core | subdomain tail ]
/// ```
///
/// - the domain prefix (2 symbols) depends only on the apex domain, so every
///   link to the same site starts the same way,
/// - the url core hashes the whole normalised URL,
/// - the tail spends one symbol per subdomain level, or, when there is no
///   subdomain, a fallback segment hashed from the URL.
///
/// The concatenation is cut or padded to the requested length.
#[derive(Debug, Clone)]
pub struct ShortcodeEncoder {
    alphabet: Alphabet,
    default_length: usize,
}

impl ShortcodeEncoder {
    pub fn new(settings: EncoderSettings) -> Self {
        Self {
            alphabet: settings.alphabet,
            default_length: settings
                .default_length
                .clamp(MIN_CODE_LENGTH, MAX_CODE_LENGTH),
        }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn default_length(&self) -> usize {
        self.default_length
    }

    /// Encodes `url` with the default length.
    pub fn encode_default(&self, url: &str) -> Encoded {
        self.encode(url, self.default_length)
    }

    /// Encodes `url` as a code of exactly `length` symbols.
    ///
    /// Lengths below 3 are replaced by the configured default and lengths
    /// above 64 are clamped to 64. Either case is reported through
    /// [`Encoded::length_coerced`].
    pub fn encode(&self, url: &str, length: usize) -> Encoded {
        self.encode_inner(url, length, None)
    }

    /// Encodes `url` as retry number `attempt` of a collision.
    ///
    /// The attempt is mixed into the hashed form of the normalised URL, so
    /// URLs that normalise alike (differing only in fragment, scheme or
    /// case) still move to a new code on every attempt. The domain prefix
    /// is unchanged.
    pub fn encode_attempt(&self, url: &str, length: usize, attempt: usize) -> Encoded {
        self.encode_inner(url, length, Some(attempt))
    }

    fn encode_inner(&self, url: &str, length: usize, attempt: Option<usize>) -> Encoded {
        let length_coerced = !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&length);
        let length = if length < MIN_CODE_LENGTH {
            debug!(
                requested = length,
                default = self.default_length,
                "code length too short, using default"
            );
            self.default_length
        } else if length > MAX_CODE_LENGTH {
            debug!(requested = length, max = MAX_CODE_LENGTH, "code length too long, clamping");
            MAX_CODE_LENGTH
        } else {
            length
        };

        let normalized = normalize(url);
        let normalized_url = normalized.as_str();
        let apex = base_domain(normalized_url);

        let key = match attempt {
            Some(attempt) => format!("{}::{}", normalized_url, attempt),
            None => normalized_url.to_string(),
        };

        let domain_source = if apex.is_empty() {
            normalized_url
        } else {
            apex.as_str()
        };
        let domain_prefix = self
            .alphabet
            .to_base(hash(domain_source), DOMAIN_PREFIX_LENGTH, "domain");

        let remaining = length.saturating_sub(DOMAIN_PREFIX_LENGTH).max(1);
        let levels = subdomain_levels(normalized_url, &apex);

        let url_core_length = remaining.saturating_sub(levels.len()).max(1);
        let url_core = self.alphabet.to_base(
            hash(&format!("{}::url", key)),
            url_core_length,
            "url",
        );

        let tail = if levels.is_empty() {
            self.alphabet.to_base(
                hash(&format!("{}::fallback", key)),
                remaining,
                "fallback",
            )
        } else {
            levels
                .iter()
                .rev()
                .enumerate()
                .map(|(index, level)| {
                    self.alphabet
                        .to_base(hash(&format!("{}::sub", level)), 1, &index.to_string())
                })
                .collect()
        };

        let mut code = format!("{}{}{}", domain_prefix, url_core, tail);
        code.truncate(length);

        let mut pad_index = 0usize;
        while code.len() < length {
            let segment = self.alphabet.to_base(
                hash(&format!("{}::pad::{}", key, pad_index)),
                length - code.len(),
                &format!("pad{}", pad_index),
            );
            code.push_str(&segment);
            pad_index += 1;
        }

        trace!(
            url = %normalized_url,
            apex = %apex,
            levels = levels.len(),
            code = %code,
            "encoded url"
        );

        Encoded {
            code: ShortCode::new_unchecked(code),
            normalization: normalized.outcome(),
            length_coerced,
        }
    }

    /// Returns true iff every character of `code` is in the alphabet.
    pub fn is_valid_shortcode(&self, code: &str) -> bool {
        self.alphabet.is_valid(code)
    }

    /// Number of distinct codes of `length` symbols, `None` past `u128`.
    pub fn max_combinations(&self, length: usize) -> Option<u128> {
        self.alphabet.max_combinations(length)
    }
}

impl Default for ShortcodeEncoder {
    fn default() -> Self {
        Self::new(EncoderSettings::default())
    }
}

impl Generator for ShortcodeEncoder {
    fn generate(&self, input: &str) -> Encoded {
        self.encode_default(input)
    }

    fn generate_attempt(&self, input: &str, attempt: usize) -> Encoded {
        self.encode_attempt(input, self.default_length, attempt)
    }
}

/// Subdomain labels left of the apex, e.g. `["a", "b"]` for `a.b.example.com`.
fn subdomain_levels(normalized_url: &str, apex: &str) -> Vec<String> {
    if apex.is_empty() {
        return Vec::new();
    }

    let Some(host) = hostname(normalized_url) else {
        return Vec::new();
    };

    if host == apex {
        return Vec::new();
    }

    match host.strip_suffix(apex).and_then(|rest| rest.strip_suffix('.')) {
        Some(subdomain) => subdomain
            .split('.')
            .filter(|level| !level.is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    }
}
