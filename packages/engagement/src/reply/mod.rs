//! Reply synthesis and the deterministic safety pipeline.

pub mod prompts;
pub mod sanitize;
pub mod synthesizer;

pub use sanitize::sanitize;
pub use synthesizer::{ReplySynthesizer, SynthesizedReply};
