//! # Polynomial Rolling Hash
//!
//! This module implements the **polynomial rolling hash** that the chained hash table uses to
//! place string keys into buckets. Each input item `x` advances the state as
//!
//! ```text
//!   h = (base * h + x) mod modulus
//! ```
//!
//! With the default base of 31 this is the classic `h = 31*h + c` string hash, reduced modulo
//! the Mersenne prime `2^61 - 1` so the value never overflows and stays stable across calls and
//! processes (no random seeding).
//!
//! ## Key Features
//! - **Configurable base** (multiplier) and **modulus** through [`PolyHashBuilder`].
//! - **Streaming** usage: successive `write` calls hash the concatenation of their input.
//! - Implements [`Hasher`], and the builder implements [`BuildHasher`], so it plugs straight
//!   into [`ChainedHashTable`](super::separate::ChainedHashTable).
//!
//! **Note**: This is **not** cryptographically secure and not resistant to crafted collisions.

use std::hash::{BuildHasher, Hasher};

/// Default base (multiplier), the classic string-hash multiplier.
const DEFAULT_BASE: u64 = 31;
/// Default modulus, 2^61-1 (a Mersenne prime).
const DEFAULT_MODULUS: u64 = 0x1FFF_FFFF_FFFF_FFFF;

/// A builder for polynomial rolling hash, allowing you to set base and modulus.
///
/// The builder is also the [`BuildHasher`] handed to hash tables: every hasher it builds starts
/// from the empty state with the configured parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolyHashBuilder {
    base: u64,
    modulus: u64,
}

impl Default for PolyHashBuilder {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE,
            modulus: DEFAULT_MODULUS,
        }
    }
}

impl PolyHashBuilder {
    /// Creates a new builder with default base/modulus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base (the multiplier used in the polynomial).
    ///
    /// # Panics
    /// If `base <= 1`.
    pub fn with_base(mut self, base: u64) -> Self {
        assert!(base > 1, "base must be > 1");
        self.base = base;
        self
    }

    /// Sets the modulus for the polynomial.
    /// Must be < 2^63 so that `add_mod` cannot wrap.
    ///
    /// # Panics
    /// If `modulus <= 1` or `modulus >= 2^63`.
    pub fn with_modulus(mut self, modulus: u64) -> Self {
        assert!(modulus > 1, "modulus must be > 1");
        assert!(modulus < (1 << 63), "modulus must be < 2^63");
        self.modulus = modulus;
        self
    }

    /// Build the polynomial rolling hasher with the specified parameters.
    pub fn build(self) -> PolynomialRollingHash {
        PolynomialRollingHash {
            base: self.base,
            modulus: self.modulus,
            current_hash: 0,
        }
    }
}

impl BuildHasher for PolyHashBuilder {
    type Hasher = PolynomialRollingHash;

    fn build_hasher(&self) -> Self::Hasher {
        self.build()
    }
}

/// A polynomial rolling hash that can be updated incrementally and returns a 64-bit hash in
/// `[0..modulus)`.
#[derive(Debug, Clone)]
pub struct PolynomialRollingHash {
    base: u64,
    modulus: u64,
    /// The current polynomial hash value
    current_hash: u64,
}

impl Default for PolynomialRollingHash {
    fn default() -> Self {
        Self::new()
    }
}

impl PolynomialRollingHash {
    /// Creates a new polynomial rolling hash with default base/modulus.
    pub fn new() -> Self {
        PolyHashBuilder::new().build()
    }

    /// Feeds the entire data slice in one shot.
    fn hash_slice(&mut self, data: &[u8]) {
        for &b in data {
            self.update(b as u64);
        }
    }

    /// Advances the hash by one item.
    fn update(&mut self, x: u64) {
        let scaled = mul_mod(self.current_hash, self.base, self.modulus);
        self.current_hash = add_mod(scaled, x % self.modulus, self.modulus);
    }
}

impl Hasher for PolynomialRollingHash {
    fn finish(&self) -> u64 {
        self.current_hash
    }

    fn write(&mut self, bytes: &[u8]) {
        self.hash_slice(bytes);
    }
}

#[inline]
fn add_mod(a: u64, b: u64, m: u64) -> u64 {
    let s = a + b;
    if s >= m {
        s - m
    } else {
        s
    }
}

#[inline]
fn mul_mod(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128 * b as u128) % m as u128) as u64
}
