use crate::constants::BASE62_SYMBOLS;
use crate::error::{CoreError, Result};
use crate::hash::hash;
use std::fmt::Display;
use std::sync::Arc;

/// The symbol set short codes are written in.
///
/// An alphabet holds at least two distinct ASCII symbols. Cloning is cheap.
#[derive(Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Arc<str>,
}

impl Alphabet {
    /// Creates an alphabet from the given symbols.
    ///
    /// # Examples
    ///
    /// ```
    /// use waypoint_core::Alphabet;
    ///
    /// let hex = Alphabet::new("0123456789abcdef").unwrap();
    /// assert_eq!(hex.base(), 16);
    /// assert!(Alphabet::new("aa").is_err());
    /// ```
    pub fn new(symbols: impl AsRef<str>) -> Result<Self> {
        let symbols = symbols.as_ref();

        if !symbols.is_ascii() {
            return Err(CoreError::InvalidAlphabet(format!(
                "symbols must be ASCII: '{}'",
                symbols
            )));
        }

        if symbols.len() < 2 {
            return Err(CoreError::InvalidAlphabet(format!(
                "at least 2 symbols are required, got {}",
                symbols.len()
            )));
        }

        let bytes = symbols.as_bytes();
        for (i, symbol) in bytes.iter().enumerate() {
            if bytes[i + 1..].contains(symbol) {
                return Err(CoreError::InvalidAlphabet(format!(
                    "duplicate symbol '{}'",
                    *symbol as char
                )));
            }
        }

        Ok(Self {
            symbols: Arc::from(symbols),
        })
    }

    /// The default alphabet: `0-9`, `a-z`, `A-Z`.
    pub fn base62() -> Self {
        Self {
            symbols: Arc::from(BASE62_SYMBOLS),
        }
    }

    /// Number of symbols.
    pub fn base(&self) -> usize {
        self.symbols.len()
    }

    pub fn as_str(&self) -> &str {
        &self.symbols
    }

    pub fn contains(&self, c: char) -> bool {
        c.is_ascii() && self.symbols.as_bytes().contains(&(c as u8))
    }

    /// Returns true iff `code` is non-empty and made only of symbols from this alphabet.
    pub fn is_valid(&self, code: &str) -> bool {
        !code.is_empty() && code.chars().all(|c| self.contains(c))
    }

    /// Number of distinct codes of the given length, `base ^ length`.
    ///
    /// Returns `None` if the count does not fit in a `u128`.
    pub fn max_combinations(&self, length: usize) -> Option<u128> {
        let exponent = u32::try_from(length).ok()?;
        (self.base() as u128).checked_pow(exponent)
    }

    /// Writes `n` as exactly `length` symbols.
    ///
    /// Digits are taken from `n` least-significant first. Once `n` is used up
    /// the remaining positions are derived from
    /// `hash("{n}::{seed}::{position}")` instead of being zero-filled, so the
    /// output never ends in a constant run. The result is a pure function of
    /// `(n, length, seed)`.
    pub fn to_base(&self, n: u64, length: usize, seed: &str) -> String {
        let base = self.base() as u64;
        let symbols = self.symbols.as_bytes();

        let mut digits = Vec::with_capacity(length);
        let mut rest = n;
        for position in 0..length {
            let digit = if rest > 0 {
                let digit = rest % base;
                rest /= base;
                digit
            } else {
                hash(&format!("{}::{}::{}", n, seed, position)) % base
            };
            digits.push(symbols[digit as usize]);
        }

        digits.iter().rev().map(|&b| b as char).collect()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::base62()
    }
}

impl std::fmt::Debug for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Alphabet").field(&self.symbols).finish()
    }
}

impl Display for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_alphabets() {
        assert!(Alphabet::new("").is_err());
        assert!(Alphabet::new("a").is_err());
        assert!(Alphabet::new("abca").is_err());
        assert!(Alphabet::new("abcé").is_err());
    }

    #[test]
    fn positional_digits_come_first() {
        let alphabet = Alphabet::base62();
        assert_eq!(alphabet.to_base(61, 1, "x"), "Z");
        assert_eq!(alphabet.to_base(62, 2, "x"), "10");
    }

    #[test]
    fn exhausted_input_is_rehashed_not_zero_padded() {
        let alphabet = Alphabet::base62();
        assert_eq!(alphabet.to_base(62, 4, "x"), "eL10");
        assert_eq!(alphabet.to_base(0, 3, "s"), "KdG");
        assert_eq!(alphabet.to_base(125, 3, "s"), "w21");
    }

    #[test]
    fn seed_only_affects_rehashed_positions() {
        let alphabet = Alphabet::base62();
        let a = alphabet.to_base(62, 6, "one");
        let b = alphabet.to_base(62, 6, "two");
        assert_eq!(&a[4..], "10");
        assert_eq!(&b[4..], "10");
        assert_ne!(a, b);
    }

    #[test]
    fn zero_length_is_empty() {
        assert_eq!(Alphabet::base62().to_base(12345, 0, "x"), "");
    }

    #[test]
    fn output_has_requested_length_and_symbols() {
        let alphabet = Alphabet::base62();
        for length in [1, 2, 6, 11, 32] {
            let encoded = alphabet.to_base(u64::MAX, length, "len");
            assert_eq!(encoded.len(), length);
            assert!(alphabet.is_valid(&encoded));
        }
    }

    #[test]
    fn max_combinations_is_exact() {
        let alphabet = Alphabet::base62();
        assert_eq!(alphabet.max_combinations(6), Some(56_800_235_584));
        assert_eq!(alphabet.max_combinations(0), Some(1));
        assert_eq!(
            alphabet.max_combinations(11),
            Some(52_036_560_683_837_093_888)
        );
        assert_eq!(alphabet.max_combinations(100), None);
    }

    #[test]
    fn validity() {
        let alphabet = Alphabet::base62();
        assert!(alphabet.is_valid("aZ09"));
        assert!(!alphabet.is_valid(""));
        assert!(!alphabet.is_valid("ab-c"));
        assert!(!alphabet.is_valid("abc ü"));
    }
}
