//! # Identifier Codec
//!
//! Catalog entries are identified by a short, URL-safe string derived from their name. The
//! derivation is a [Hashids](https://hashids.org) encoding of the name's Unicode code
//! points, done by the `harsh` crate: deterministic (the same name always yields the same
//! id) and reversible (the id decodes back to the name).
//!
//! The process-wide codec uses the fixed salt `"Best salt"`, a minimum length of 8 and the
//! 62-character alphanumeric alphabet, so ids stay stable across restarts and match the
//! `[a-zA-Z0-9]+` path segment the item routes accept.
//!
//! ```rust
//! let id = stockroom::codec::encode("widget").unwrap();
//! assert!(id.len() >= 8);
//! assert_eq!(stockroom::codec::decode(&id).unwrap(), "widget");
//! ```
//!
//! Callers lower-case names before encoding; the codec itself is case-sensitive.

use harsh::Harsh;
use std::fmt;
use std::sync::OnceLock;

pub const DEFAULT_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890";
pub const SALT: &str = "Best salt";
pub const MIN_LENGTH: usize = 8;

const MIN_ALPHABET_LENGTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("alphabet must contain at least 16 unique characters, got {0}")]
    AlphabetTooShort(usize),
    #[error("alphabet must not contain spaces")]
    AlphabetContainsSpace,
    #[error("invalid codec configuration: {0}")]
    Config(String),
    #[error("{0:?} is not a valid identifier")]
    Malformed(String),
    #[error("identifier decodes to {0}, which is not a Unicode scalar value")]
    InvalidCodePoint(u64),
}

/// A configured encoder/decoder for integer sequences.
pub struct IdCodec {
    inner: Harsh,
    min_length: usize,
}

impl fmt::Debug for IdCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdCodec")
            .field("min_length", &self.min_length)
            .finish_non_exhaustive()
    }
}

impl IdCodec {
    pub fn new(salt: &str, min_length: usize) -> Result<Self, CodecError> {
        Self::with_alphabet(salt, min_length, DEFAULT_ALPHABET)
    }

    pub fn with_alphabet(salt: &str, min_length: usize, alphabet: &str) -> Result<Self, CodecError> {
        let mut unique: Vec<char> = Vec::with_capacity(alphabet.len());
        for c in alphabet.chars() {
            if !unique.contains(&c) {
                unique.push(c);
            }
        }
        if unique.len() < MIN_ALPHABET_LENGTH {
            return Err(CodecError::AlphabetTooShort(unique.len()));
        }
        if unique.contains(&' ') {
            return Err(CodecError::AlphabetContainsSpace);
        }
        if !alphabet.is_ascii() {
            return Err(CodecError::Config("alphabet must be ASCII".into()));
        }

        let inner = Harsh::builder()
            .salt(salt)
            .length(min_length)
            .alphabet(unique.into_iter().collect::<String>())
            .build()
            .map_err(|e| CodecError::Config(e.to_string()))?;

        Ok(Self { inner, min_length })
    }

    /// Encodes a sequence of numbers. An empty sequence encodes to the empty string.
    pub fn encode_numbers(&self, numbers: &[u64]) -> String {
        if numbers.is_empty() {
            return String::new();
        }
        self.inner.encode(numbers)
    }

    /// Decodes an id produced by [`IdCodec::encode_numbers`].
    pub fn decode_numbers(&self, id: &str) -> Result<Vec<u64>, CodecError> {
        if id.is_empty() {
            return Ok(Vec::new());
        }
        let numbers = self
            .inner
            .decode(id)
            .map_err(|_| CodecError::Malformed(id.to_string()))?;

        // Only the canonical spelling of a sequence is accepted.
        if numbers.is_empty() || self.encode_numbers(&numbers) != id {
            return Err(CodecError::Malformed(id.to_string()));
        }
        Ok(numbers)
    }

    /// Encodes the code points of `s`.
    pub fn encode(&self, s: &str) -> String {
        let points: Vec<u64> = s.chars().map(|c| c as u64).collect();
        self.encode_numbers(&points)
    }

    /// Decodes an id back into the string whose code points it carries.
    pub fn decode(&self, id: &str) -> Result<String, CodecError> {
        self.decode_numbers(id)?
            .into_iter()
            .map(|n| {
                u32::try_from(n)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or(CodecError::InvalidCodePoint(n))
            })
            .collect()
    }
}

static DEFAULT_CODEC: OnceLock<Result<IdCodec, CodecError>> = OnceLock::new();

fn default_codec() -> Result<&'static IdCodec, CodecError> {
    DEFAULT_CODEC
        .get_or_init(|| IdCodec::new(SALT, MIN_LENGTH))
        .as_ref()
        .map_err(Clone::clone)
}

/// Encodes `s` with the process-wide codec.
pub fn encode(s: &str) -> Result<String, CodecError> {
    Ok(default_codec()?.encode(s))
}

/// Decodes an id produced by [`encode`].
pub fn decode(id: &str) -> Result<String, CodecError> {
    default_codec()?.decode(id)
}
