pub mod cs;
pub mod error;

pub use cs::hashing::separate::{ChainedHashTable, ChainedHashTableBuilder};
pub use cs::randomized::short_link::{ShortLinkService, ShortLinkServiceBuilder};
pub use error::{Error, Result};
