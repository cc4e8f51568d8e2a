pub mod hashing;
pub mod randomized;

pub use hashing::*;
pub use randomized::*;
