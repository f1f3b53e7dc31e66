//! Random password generation for `generate` and `creds add --autogenerate`.

use rand::Rng;
use zeroize::Zeroizing;

use crate::errors::{LockboxError, Result};

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Which character classes a generated password draws from.
///
/// Letters are always included.
#[derive(Debug, Clone, Copy)]
pub struct PasswordOptions {
    pub length: usize,
    pub numbers: bool,
    pub symbols: bool,
}

impl Default for PasswordOptions {
    fn default() -> Self {
        Self {
            length: 15,
            numbers: true,
            symbols: true,
        }
    }
}

impl PasswordOptions {
    fn alphabet(&self) -> Vec<u8> {
        let mut chars = LETTERS.to_vec();
        if self.numbers {
            chars.extend_from_slice(DIGITS);
        }
        if self.symbols {
            chars.extend_from_slice(SYMBOLS);
        }
        chars
    }
}

/// Draw a password uniformly from the selected alphabet.
pub fn generate_password(options: &PasswordOptions) -> Result<Zeroizing<String>> {
    if options.length == 0 {
        return Err(LockboxError::CommandFailed(
            "password length must be at least 1".into(),
        ));
    }

    let alphabet = options.alphabet();
    let mut rng = rand::rng();
    let password: String = (0..options.length)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
        .collect();

    Ok(Zeroizing::new(password))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn respects_length() {
        let options = PasswordOptions {
            length: 42,
            ..Default::default()
        };
        assert_eq!(generate_password(&options).unwrap().len(), 42);
    }

    #[test]
    fn letters_only_when_classes_disabled() {
        let options = PasswordOptions {
            length: 200,
            numbers: false,
            symbols: false,
        };
        let pw = generate_password(&options).unwrap();
        assert!(pw.chars().all(|c| c.is_ascii_alphabetic()));
    }

    #[test]
    fn zero_length_rejected() {
        let options = PasswordOptions {
            length: 0,
            ..Default::default()
        };
        assert!(generate_password(&options).is_err());
    }

    #[test]
    fn two_passwords_differ() {
        let options = PasswordOptions::default();
        assert_ne!(
            *generate_password(&options).unwrap(),
            *generate_password(&options).unwrap()
        );
    }
}
