pub mod polynomial_rolling;
pub mod separate;

pub use polynomial_rolling::{PolyHashBuilder, PolynomialRollingHash};
pub use separate::{ChainedHashTable, ChainedHashTableBuilder};
