//! Short-link resolution: persistent cache, provider, local fallback.

pub mod bitly;
pub mod resolver;

pub use bitly::BitlyShortener;
pub use resolver::ShortLinkResolver;
