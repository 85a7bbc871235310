//! Explicit component configuration.
//!
//! Every tunable is passed in at construction; nothing reads ambient or
//! static state.

/// Configuration for the reply synthesizer and its safety pipeline.
#[derive(Debug, Clone)]
pub struct SynthesizerConfig {
    /// Hard cap applied by the sanitizer, truncating at a word boundary.
    pub max_reply_chars: usize,

    /// Length window the prompt asks the provider to stay under. Kept
    /// below `max_reply_chars` so CTA injection has room.
    pub prompt_char_window: usize,

    /// Probability of appending a soft call-to-action phrase.
    /// Pin to 0.0 or 1.0 in tests to force the branch.
    pub cta_probability: f64,

    /// Probability of appending the short link.
    /// Pin to 0.0 or 1.0 in tests to force the branch.
    pub link_probability: f64,

    /// Confidence score attached to every suggestion.
    pub confidence: f64,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            max_reply_chars: 240,
            prompt_char_window: 200,
            cta_probability: 0.4,
            link_probability: 1.0 / 3.0,
            confidence: 0.85,
        }
    }
}

impl SynthesizerConfig {
    /// Set the CTA injection probability.
    pub fn with_cta_probability(mut self, p: f64) -> Self {
        self.cta_probability = p;
        self
    }

    /// Set the link injection probability.
    pub fn with_link_probability(mut self, p: f64) -> Self {
        self.link_probability = p;
        self
    }

    /// Set the sanitizer's maximum reply length.
    pub fn with_max_reply_chars(mut self, max: usize) -> Self {
        self.max_reply_chars = max;
        self
    }
}
