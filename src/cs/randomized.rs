pub mod short_link;

pub use short_link::{ShortLinkService, ShortLinkServiceBuilder};
