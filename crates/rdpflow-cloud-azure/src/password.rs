//! Admin password generation
//!
//! Azure accepts VM admin passwords of 12 to 123 characters that cover at
//! least 3 of 4 character classes (lowercase, uppercase, digit, symbol).
//!
//! A candidate is drawn from the OS random source and base64-rendered. If
//! it misses the policy, a single repair pass overwrites one random
//! position per missing class. Repairs can land on the same position, so
//! a repaired password is not guaranteed to cover every injected class;
//! only the last injection is certain to survive.

use base64::Engine;
use rand::rngs::OsRng;
use rand::{CryptoRng, Rng, RngCore};

pub const MIN_LENGTH: usize = 12;
pub const MAX_LENGTH: usize = 123;
pub const DEFAULT_LENGTH: usize = 12;

const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()-_=+[]{}|;:,.<>?";

/// Which character classes a string covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CharClasses {
    pub lowercase: bool,
    pub uppercase: bool,
    pub digit: bool,
    pub symbol: bool,
}

impl CharClasses {
    pub fn of(s: &str) -> Self {
        Self {
            lowercase: s.chars().any(|c| c.is_ascii_lowercase()),
            uppercase: s.chars().any(|c| c.is_ascii_uppercase()),
            digit: s.chars().any(|c| c.is_ascii_digit()),
            symbol: s.chars().any(|c| !c.is_ascii_alphanumeric()),
        }
    }

    pub fn count(&self) -> usize {
        self.letters_and_digits() + usize::from(self.symbol)
    }

    /// Coverage of lowercase, uppercase and digit only
    pub fn letters_and_digits(&self) -> usize {
        [self.lowercase, self.uppercase, self.digit]
            .iter()
            .filter(|b| **b)
            .count()
    }

    pub fn meets_policy(&self) -> bool {
        self.count() >= 3
    }
}

/// Clamp a requested length into the accepted range
pub fn clamp_length(length: usize) -> usize {
    length.clamp(MIN_LENGTH, MAX_LENGTH)
}

/// Generate a password from the OS random source
pub fn generate(length: usize) -> String {
    generate_with(&mut OsRng, length)
}

/// Generate a password of `clamp_length(length)` characters using `rng`
pub fn generate_with<R: RngCore + CryptoRng>(rng: &mut R, length: usize) -> String {
    let length = clamp_length(length);

    let mut bytes = vec![0u8; length];
    rng.fill_bytes(&mut bytes);
    let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
    let candidate: String = encoded.chars().take(length).collect();

    enforce_policy(&candidate, rng)
}

/// Return `candidate` unchanged if it meets the policy, otherwise repair it
pub fn enforce_policy<R: Rng>(candidate: &str, rng: &mut R) -> String {
    let classes = CharClasses::of(candidate);
    if classes.meets_policy() {
        return candidate.to_string();
    }
    repair(candidate, &classes, rng)
}

/// One repair pass over a candidate with the given class coverage
///
/// Lowercase, uppercase and digit are injected whenever missing. A symbol
/// is injected only when fewer than two of those three were present.
pub fn repair<R: Rng>(candidate: &str, classes: &CharClasses, rng: &mut R) -> String {
    let mut password = candidate.to_string();

    if !classes.lowercase {
        password = replace_random_char(&password, LOWERCASE, rng);
    }
    if !classes.uppercase {
        password = replace_random_char(&password, UPPERCASE, rng);
    }
    if !classes.digit {
        password = replace_random_char(&password, DIGITS, rng);
    }
    if !classes.symbol && classes.letters_and_digits() < 2 {
        password = replace_random_char(&password, SYMBOLS, rng);
    }

    password
}

fn replace_random_char<R: Rng>(s: &str, charset: &str, rng: &mut R) -> String {
    let mut chars: Vec<char> = s.chars().collect();
    if chars.is_empty() {
        return String::new();
    }

    let set: Vec<char> = charset.chars().collect();
    let index = rng.gen_range(0..chars.len());
    chars[index] = set[rng.gen_range(0..set.len())];
    chars.into_iter().collect()
}
