//! Social Engagement Pipeline Library
//!
//! Turns raw discovered posts into safety-checked, deduplicated,
//! reviewable reply tasks through a two-stage event pipeline:
//!
//! 1. **Ingestion & enrichment**: fetch campaign/product context,
//!    resolve a reusable short link, synthesize a moderated reply, emit a
//!    suggestion event. Unrecoverable failures go to a dead-letter stream.
//! 2. **Task persistence**: deduplicate by source-post identity and
//!    persist a `Pending` task for review or automation.
//!
//! # Design Philosophy
//!
//! - Every external capability (context services, text generation, link
//!   shortening, storage, the broker) sits behind a single-concern trait
//!   with failure as an explicit value, so fallback logic is a normal
//!   code path and every stage runs in tests without live collaborators.
//! - Hard output constraints (no links, no hashtags, bounded length) are
//!   enforced by a deterministic safety pipeline that does not trust the
//!   generative provider.
//! - Idempotency lives in storage constraints, not application locks.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use engagement::{
//!     IngestStage, PersistStage, ReplySynthesizer, ShortLinkResolver,
//!     SynthesizerConfig, MemoryStore,
//! };
//! use engagement::testing::{CapturePublisher, MockCampaigns, MockGenerator, MockProducts};
//!
//! let stage = IngestStage::new(
//!     MockCampaigns::new(),
//!     MockProducts::new(),
//!     ShortLinkResolver::new(MemoryStore::new()),
//!     ReplySynthesizer::new(MockGenerator::with_response("{...}"), SynthesizerConfig::default()),
//!     Arc::new(CapturePublisher::new()),
//! );
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core capability abstractions
//! - [`types`] - Domain types
//! - [`pipeline`] - The two pipeline stages
//! - [`reply`] - Reply synthesis and the safety pipeline
//! - [`shortlink`] - Short-link resolution
//! - [`clients`] - HTTP clients for campaign/product read models
//! - [`ai`] - Generative-text provider implementations
//! - [`stores`] - Storage implementations (memory, Postgres)
//! - [`testing`] - Mock implementations for testing

pub mod ai;
pub mod clients;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod reply;
pub mod shortlink;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use config::SynthesizerConfig;
pub use error::{EngagementError, ShortenError};
pub use traits::{
    stream::subjects, CampaignSource, EventPublisher, LinkShortener, ProductSource,
    ShortLinkStore, TaskStore, TextGenerator,
};
pub use types::{
    CampaignContext, CampaignMode, DiscoveredPost, LinkProvider, NewShortLink, NewTask,
    ProductContext, ReplySuggestion, ShortLinkRecord, Task, TaskStatus, TaskStatusCounts,
};

pub use clients::{CampaignClient, ProductClient};
pub use pipeline::{IngestOutcome, IngestStage, PersistOutcome, PersistStage};
pub use reply::{ReplySynthesizer, SynthesizedReply};
pub use shortlink::{BitlyShortener, ShortLinkResolver};
pub use stores::MemoryStore;

#[cfg(feature = "postgres")]
pub use stores::PostgresStore;
