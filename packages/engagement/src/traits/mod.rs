//! Core trait abstractions.
//!
//! Each external capability is a single-concern trait with failure as an
//! explicit value, so fallback logic is a normal code path and every stage
//! is testable without live collaborators.

pub mod context;
pub mod generator;
pub mod shortener;
pub mod store;
pub mod stream;

pub use context::{CampaignSource, ProductSource};
pub use generator::TextGenerator;
pub use shortener::LinkShortener;
pub use store::{ShortLinkStore, TaskStore};
pub use stream::EventPublisher;
