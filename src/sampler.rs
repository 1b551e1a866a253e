//! Uniform random sampling over configurable character alphabets, backed by
//! the OS random source.

use rand::Rng;
use rand::rngs::OsRng;

use crate::error::{Error, Result};

const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
/// The set used when the caller asks for "the default specials".
pub const DEFAULT_SPECIAL: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// The special-character dimension of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialChars {
    None,
    Default,
    Custom(String),
}

/// Requested character classes. What the user asked for and what is
/// actually used are kept separate: `resolve` produces the effective
/// configuration, applying the all-classes fallback when nothing was
/// selected, and only the effective one is described and persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharsetSpec {
    pub lower: bool,
    pub upper: bool,
    pub digits: bool,
    pub special: SpecialChars,
}

impl CharsetSpec {
    /// The effective configuration. A request with no classes and no
    /// special characters falls back to all four classes with the default
    /// special set; this is the only place the fallback is applied.
    pub fn resolve(&self) -> CharsetSpec {
        if !self.lower && !self.upper && !self.digits && self.special_set().is_none() {
            return CharsetSpec {
                lower: true,
                upper: true,
                digits: true,
                special: SpecialChars::Default,
            };
        }
        self.clone()
    }

    fn special_set(&self) -> Option<&str> {
        match &self.special {
            SpecialChars::None => None,
            SpecialChars::Default => Some(DEFAULT_SPECIAL),
            SpecialChars::Custom(s) if s.is_empty() => None,
            SpecialChars::Custom(s) => Some(s),
        }
    }

    /// The assembled alphabet, classes in fixed order.
    pub fn alphabet(&self) -> Vec<char> {
        let mut chars = String::new();
        if self.lower {
            chars.push_str(LOWER);
        }
        if self.upper {
            chars.push_str(UPPER);
        }
        if self.digits {
            chars.push_str(DIGITS);
        }
        if let Some(s) = self.special_set() {
            chars.push_str(s);
        }
        chars.chars().collect()
    }

    /// Human-readable summary of the classes in play, stored next to the
    /// generated password.
    pub fn description(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if self.lower {
            parts.push("lowercase".to_string());
        }
        if self.upper {
            parts.push("uppercase".to_string());
        }
        if self.digits {
            parts.push("digits".to_string());
        }
        if let Some(s) = self.special_set() {
            parts.push(format!("special({s})"));
        }
        parts.join(", ")
    }
}

/// Draw `length` characters independently and uniformly from `alphabet`.
/// `gen_range` resamples internally when the source range does not divide
/// evenly, so every character has equal probability.
fn sample(alphabet: &[char], length: usize) -> String {
    let mut rng = OsRng;
    (0..length)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
        .collect()
}

/// Generate a password under `spec`. Returns the password together with
/// the effective-configuration description to persist next to it.
pub fn generate_password(spec: &CharsetSpec, length: i64) -> Result<(String, String)> {
    if length <= 0 {
        return Err(Error::Validation(
            "password length must be greater than 0".to_string(),
        ));
    }
    let effective = spec.resolve();
    let alphabet = effective.alphabet();
    if alphabet.is_empty() {
        return Err(Error::Validation(
            "no characters available for password generation".to_string(),
        ));
    }
    Ok((sample(&alphabet, length as usize), effective.description()))
}

/// Generate `length` uniformly random decimal digits.
pub fn generate_pin(length: i64) -> Result<String> {
    if length <= 0 {
        return Err(Error::Validation(
            "PIN length must be greater than 0".to_string(),
        ));
    }
    let digits: Vec<char> = DIGITS.chars().collect();
    Ok(sample(&digits, length as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn all_classes() -> CharsetSpec {
        CharsetSpec {
            lower: true,
            upper: true,
            digits: true,
            special: SpecialChars::Default,
        }
    }

    fn nothing_requested() -> CharsetSpec {
        CharsetSpec {
            lower: false,
            upper: false,
            digits: false,
            special: SpecialChars::None,
        }
    }

    #[test]
    fn password_has_exact_length_and_stays_in_alphabet() {
        let spec = all_classes();
        let alphabet = spec.alphabet();
        let (password, _) = generate_password(&spec, 64).unwrap();
        assert_eq!(password.chars().count(), 64);
        assert!(password.chars().all(|c| alphabet.contains(&c)));
    }

    #[test]
    fn empty_request_falls_back_to_all_classes() {
        let (password, config) = generate_password(&nothing_requested(), 32).unwrap();
        assert_eq!(password.len(), 32);
        assert_eq!(
            config,
            format!("lowercase, uppercase, digits, special({DEFAULT_SPECIAL})")
        );
    }

    #[test]
    fn explicit_empty_custom_set_also_falls_back() {
        let spec = CharsetSpec {
            special: SpecialChars::Custom(String::new()),
            ..nothing_requested()
        };
        let resolved = spec.resolve();
        assert!(resolved.lower && resolved.upper && resolved.digits);
        assert_eq!(resolved.special, SpecialChars::Default);
    }

    #[test]
    fn partial_request_is_not_touched_by_the_fallback() {
        let spec = CharsetSpec {
            digits: true,
            ..nothing_requested()
        };
        let resolved = spec.resolve();
        assert_eq!(resolved, spec);
        assert_eq!(resolved.description(), "digits");
    }

    #[test]
    fn custom_specials_show_up_in_the_description() {
        let spec = CharsetSpec {
            lower: true,
            upper: false,
            digits: false,
            special: SpecialChars::Custom("!?".to_string()),
        };
        assert_eq!(spec.description(), "lowercase, special(!?)");
        let alphabet = spec.alphabet();
        assert_eq!(alphabet.len(), 28);
    }

    #[test]
    fn non_positive_length_is_a_validation_error() {
        for bad in [0, -1, -100] {
            assert!(matches!(
                generate_password(&all_classes(), bad),
                Err(Error::Validation(_))
            ));
            assert!(matches!(generate_pin(bad), Err(Error::Validation(_))));
        }
    }

    #[test]
    fn pin_is_all_decimal_digits() {
        let pin = generate_pin(12).unwrap();
        assert_eq!(pin.len(), 12);
        assert!(pin.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn sampling_is_statistically_uniform() {
        // 88 characters across all four classes; 2000 draws of 44 chars
        // gives an expected count of 1000 per character. A band of +/-30%
        // is far beyond any plausible random excursion but catches class
        // omissions and gross bias immediately.
        let spec = all_classes();
        let alphabet = spec.alphabet();
        assert_eq!(alphabet.len(), 88);

        let mut counts: HashMap<char, u64> = HashMap::new();
        for _ in 0..2000 {
            let (password, _) = generate_password(&spec, 44).unwrap();
            for c in password.chars() {
                *counts.entry(c).or_insert(0) += 1;
            }
        }

        let expected = 2000 * 44 / 88;
        for c in &alphabet {
            let n = *counts.get(c).unwrap_or(&0);
            assert!(
                n > expected * 7 / 10 && n < expected * 13 / 10,
                "character {c:?} drawn {n} times, expected about {expected}"
            );
        }
    }
}
