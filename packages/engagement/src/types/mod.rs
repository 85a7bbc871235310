//! Domain types for the engagement pipeline.

pub mod context;
pub mod post;
pub mod shortlink;
pub mod suggestion;
pub mod task;

pub use context::{CampaignContext, CampaignMode, ProductContext};
pub use post::DiscoveredPost;
pub use shortlink::{LinkProvider, NewShortLink, ShortLinkRecord};
pub use suggestion::ReplySuggestion;
pub use task::{NewTask, Task, TaskStatus, TaskStatusCounts};
