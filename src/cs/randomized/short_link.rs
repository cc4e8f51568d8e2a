//! # Short Link Service
//!
//! Maps long URLs to short, fixed-length alphanumeric codes and back. The service owns a
//! [`ChainedHashTable`] keyed by code; each successful `insert_url` mints a fresh code that is
//! not currently stored and records the association.
//!
//! Codes are drawn uniformly at random from the alphabet. A drawn code that collides with a
//! stored one is discarded and a new one drawn, up to a configurable number of attempts. With the
//! defaults (8 characters over 62 symbols) the space holds 62^8 codes, so retries are rare.
//!
//! The random source is injectable, which keeps the service deterministic under a seeded
//! generator:
//!
//! ```rust
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//! use shortlink::ShortLinkServiceBuilder;
//!
//! let mut service = ShortLinkServiceBuilder::new()
//!     .with_rng(ChaCha20Rng::seed_from_u64(42))
//!     .build()
//!     .unwrap();
//!
//! let code = service.insert_url("https://x.example/a").unwrap();
//! assert_eq!(code.len(), 8);
//! assert_eq!(service.redirect(&code), Some("https://x.example/a"));
//! ```

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::cs::hashing::separate::ChainedHashTable;
use crate::error::{Error, Result};

/// Default number of characters in a short code.
pub const CODE_LENGTH: usize = 8;

/// Default code alphabet: uppercase, lowercase and digits (62 symbols).
pub const ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Default bound on candidate codes drawn per `insert_url`.
const DEFAULT_MAX_ATTEMPTS: usize = 1024;

/// Default initial capacity of the underlying table.
const DEFAULT_CAPACITY: usize = 16;

/// A builder for [`ShortLinkService`].
pub struct ShortLinkServiceBuilder<R> {
    code_length: usize,
    alphabet: String,
    capacity: usize,
    max_attempts: usize,
    rng: R,
}

impl Default for ShortLinkServiceBuilder<ChaCha20Rng> {
    fn default() -> Self {
        Self {
            code_length: CODE_LENGTH,
            alphabet: ALPHABET.to_string(),
            capacity: DEFAULT_CAPACITY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            rng: ChaCha20Rng::from_entropy(),
        }
    }
}

impl ShortLinkServiceBuilder<ChaCha20Rng> {
    /// Creates a builder with the default settings and an entropy-seeded ChaCha20 generator.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: Rng> ShortLinkServiceBuilder<R> {
    /// Number of characters in each generated code.
    pub fn with_code_length(mut self, code_length: usize) -> Self {
        self.code_length = code_length;
        self
    }

    /// Characters codes are drawn from. Must be non-empty and free of duplicates.
    pub fn with_alphabet<S: Into<String>>(mut self, alphabet: S) -> Self {
        self.alphabet = alphabet.into();
        self
    }

    /// Initial capacity of the underlying table.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Maximum number of candidate codes drawn before `insert_url` gives up.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the random source used to draw codes.
    pub fn with_rng<T: Rng>(self, rng: T) -> ShortLinkServiceBuilder<T> {
        ShortLinkServiceBuilder {
            code_length: self.code_length,
            alphabet: self.alphabet,
            capacity: self.capacity,
            max_attempts: self.max_attempts,
            rng,
        }
    }

    /// Build the service.
    ///
    /// # Errors
    /// `InvalidArgument` for a zero code length, an empty or duplicate-containing alphabet, a
    /// zero attempt bound, or a capacity the table rejects.
    pub fn build(self) -> Result<ShortLinkService<R>> {
        if self.code_length == 0 {
            return Err(Error::invalid_argument("code length must be > 0"));
        }
        let alphabet: Vec<char> = self.alphabet.chars().collect();
        if alphabet.is_empty() {
            return Err(Error::invalid_argument("alphabet must not be empty"));
        }
        let mut distinct = alphabet.clone();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() != alphabet.len() {
            return Err(Error::invalid_argument(format!(
                "alphabet {:?} contains duplicate characters",
                self.alphabet
            )));
        }
        if self.max_attempts == 0 {
            return Err(Error::invalid_argument("max attempts must be > 0"));
        }

        Ok(ShortLinkService {
            table: ChainedHashTable::with_capacity(self.capacity)?,
            alphabet,
            code_length: self.code_length,
            max_attempts: self.max_attempts,
            rng: self.rng,
        })
    }
}

/// URL shortener storing code -> URL associations in a [`ChainedHashTable`].
///
/// Shortening the same URL twice yields two distinct codes; URLs are never deduplicated.
#[derive(Clone)]
pub struct ShortLinkService<R = ChaCha20Rng> {
    table: ChainedHashTable<String>,
    alphabet: Vec<char>,
    code_length: usize,
    max_attempts: usize,
    rng: R,
}

impl ShortLinkService {
    /// Creates an empty service with 8-character alphanumeric codes.
    pub fn new() -> Self {
        Self {
            table: ChainedHashTable::new(),
            alphabet: ALPHABET.chars().collect(),
            code_length: CODE_LENGTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            rng: ChaCha20Rng::from_entropy(),
        }
    }
}

impl Default for ShortLinkService {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> ShortLinkService<R> {
    /// Draws `code_length` characters independently and uniformly from the alphabet.
    /// The result may already be in use.
    pub fn generate_random_code(&mut self) -> String {
        let alphabet = &self.alphabet;
        let rng = &mut self.rng;
        (0..self.code_length)
            .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
            .collect()
    }

    /// Draws codes until one is not stored in the table.
    ///
    /// # Errors
    /// `ExhaustedKeySpace` if every one of the `max_attempts` candidates was taken.
    pub fn generate_unique_code(&mut self) -> Result<String> {
        for attempt in 1..=self.max_attempts {
            let code = self.generate_random_code();
            if !self.table.contains_key(&code) {
                return Ok(code);
            }
            log::trace!("Short code {} already taken (attempt {})", code, attempt);
        }
        log::warn!(
            "No free short code after {} attempts ({} codes stored)",
            self.max_attempts,
            self.table.size()
        );
        Err(Error::ExhaustedKeySpace {
            attempts: self.max_attempts,
        })
    }

    /// Shortens `url`, returning the newly minted code.
    ///
    /// # Errors
    /// `InvalidArgument` if `url` is empty, `ExhaustedKeySpace` if no free code was found.
    pub fn insert_url(&mut self, url: &str) -> Result<String> {
        if url.is_empty() {
            return Err(Error::invalid_argument("url must not be empty"));
        }
        let code = self.generate_unique_code()?;
        let inserted = self.table.put(code.clone(), url.to_string());
        debug_assert!(inserted, "unique code {} was already stored", code);
        Ok(code)
    }
}

impl<R> ShortLinkService<R> {
    /// The URL stored under `code`, if any.
    pub fn redirect(&self, code: &str) -> Option<&str> {
        self.table.get(code).map(String::as_str)
    }

    /// True if `code` is currently stored.
    pub fn contains_code(&self, code: &str) -> bool {
        self.table.contains_key(code)
    }

    /// Removes `code` and returns the URL it pointed to.
    pub fn remove_url(&mut self, code: &str) -> Option<String> {
        self.table.remove(code)
    }

    /// Number of stored codes.
    pub fn url_count(&self) -> usize {
        self.table.size()
    }

    /// Load factor of the underlying table.
    pub fn load_factor(&self) -> f64 {
        self.table.load_factor()
    }

    /// Bucket count of the underlying table.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// True if no codes are stored.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Number of characters in each generated code.
    pub fn code_length(&self) -> usize {
        self.code_length
    }
}

impl<R> fmt::Display for ShortLinkService<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ShortLinkService{{urlCount={}, loadFactor={:.4}, codeLength={}, table={}}}",
            self.table.size(),
            self.table.load_factor(),
            self.code_length,
            self.table
        )
    }
}
