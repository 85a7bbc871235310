//! Reply synthesis: prompt the provider, parse, then post-process.
//!
//! The post-processing steps are deterministic and provider-independent,
//! so the hard constraints hold even when the generative step is
//! unreliable or adversarially prompted.

use rand::{thread_rng, Rng};
use serde::Deserialize;
use tracing::warn;

use super::prompts;
use super::sanitize::sanitize;
use crate::config::SynthesizerConfig;
use crate::error::Result;
use crate::traits::TextGenerator;

/// Soft call-to-action phrases. Link-free by construction; they survive
/// re-sanitization untouched.
const CTA_PHRASES: &[&str] = &[
    "More in our profile if you're curious.",
    "Our profile has the full story.",
    "Details are in our bio.",
];

/// A reply already carrying one of these tokens points out-of-band on its
/// own, so no CTA is appended.
const CTA_MARKERS: &[&str] = &["profile", "bio"];

/// Canned replies for when the provider is unreachable. No links, no
/// hashtags.
const FALLBACK_TEMPLATES: &[&str] = &[
    "Love seeing this! {title} came from the same place, if you're ever curious.",
    "This is lovely. We put the same care into {title}.",
    "So glad this showed up in our feed. It's exactly why we make {title}.",
];

/// A moderated reply with its content-safety analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedReply {
    pub reply_text: String,
    pub is_risky: bool,
    pub risk_reason: Option<String>,
}

/// Structured form the provider is asked to return.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProviderReply {
    reply_text: String,
    #[serde(default)]
    is_risky: bool,
    #[serde(default)]
    risk_reason: Option<String>,
}

/// Builds a moderation-aware prompt, invokes the provider, and runs the
/// result through the safety pipeline.
pub struct ReplySynthesizer<G: TextGenerator> {
    generator: G,
    config: SynthesizerConfig,
}

impl<G: TextGenerator> ReplySynthesizer<G> {
    pub fn new(generator: G, config: SynthesizerConfig) -> Self {
        Self { generator, config }
    }

    /// The configuration this synthesizer was built with.
    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    /// Synthesize a reply to `post_text` promoting `product_title`.
    ///
    /// Never fails: provider errors degrade to a template reply, and the
    /// sanitize/CTA/link steps are applied on every path.
    pub async fn synthesize(
        &self,
        post_text: &str,
        product_title: &str,
        short_link: Option<&str>,
    ) -> SynthesizedReply {
        let (raw, is_risky, risk_reason) = match self.generate(post_text, product_title).await {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "text generation failed, using fallback reply");
                (self.fallback_reply(product_title), false, None)
            }
        };

        let mut reply = sanitize(&raw, self.config.max_reply_chars);
        reply = self.inject_cta(reply);
        reply = self.inject_link(reply, short_link);

        SynthesizedReply {
            reply_text: reply,
            is_risky,
            risk_reason,
        }
    }

    async fn generate(
        &self,
        post_text: &str,
        product_title: &str,
    ) -> Result<(String, bool, Option<String>)> {
        let prompt =
            prompts::reply_prompt(post_text, product_title, self.config.prompt_char_window);
        let raw = self.generator.generate(prompts::SYSTEM_PROMPT, &prompt).await?;

        if raw.trim().is_empty() {
            warn!("provider returned empty output, using fallback reply");
            return Ok((self.fallback_reply(product_title), false, None));
        }

        Ok(parse_provider_reply(&raw))
    }

    fn fallback_reply(&self, product_title: &str) -> String {
        pick(FALLBACK_TEMPLATES).replace("{title}", product_title)
    }

    /// Append a soft CTA with probability `cta_probability`, unless the
    /// reply already points at the profile. Re-sanitized afterwards.
    fn inject_cta(&self, text: String) -> String {
        let lower = text.to_lowercase();
        if CTA_MARKERS.iter().any(|marker| lower.contains(marker)) {
            return text;
        }
        if !roll(self.config.cta_probability) {
            return text;
        }

        let phrase = pick(CTA_PHRASES);
        let joined = if text.is_empty() {
            phrase.to_string()
        } else if text.ends_with(['.', '!', '?']) {
            format!("{text} {phrase}")
        } else {
            format!("{text}. {phrase}")
        };

        sanitize(&joined, self.config.max_reply_chars)
    }

    /// Append the short link with probability `link_probability`. The one
    /// deliberate link in the output, exempt from re-sanitization.
    fn inject_link(&self, text: String, short_link: Option<&str>) -> String {
        let Some(link) = short_link else {
            return text;
        };
        if !roll(self.config.link_probability) {
            return text;
        }

        if text.is_empty() {
            link.to_string()
        } else {
            format!("{text} {link}")
        }
    }
}

/// Parse the provider's output, tolerating code fences. A response that
/// isn't the requested JSON is used verbatim as the reply, not risky.
fn parse_provider_reply(raw: &str) -> (String, bool, Option<String>) {
    let body = strip_code_fences(raw);
    match serde_json::from_str::<ProviderReply>(body) {
        Ok(parsed) if !parsed.reply_text.trim().is_empty() => {
            (parsed.reply_text, parsed.is_risky, parsed.risk_reason)
        }
        _ => (raw.trim().to_string(), false, None),
    }
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn roll(probability: f64) -> bool {
    thread_rng().gen_bool(probability.clamp(0.0, 1.0))
}

fn pick<'a>(options: &[&'a str]) -> &'a str {
    options[thread_rng().gen_range(0..options.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockGenerator;

    fn config() -> SynthesizerConfig {
        // Both probabilistic branches off unless a test turns them on
        SynthesizerConfig::default()
            .with_cta_probability(0.0)
            .with_link_probability(0.0)
    }

    #[tokio::test]
    async fn parses_structured_provider_output() {
        let generator = MockGenerator::with_response(
            r#"{"replyText": "That mug looks great on your desk.", "isRisky": true, "riskReason": "political thread"}"#,
        );
        let synthesizer = ReplySynthesizer::new(generator, config());

        let reply = synthesizer.synthesize("love it", "Stoneware Mug", None).await;

        assert_eq!(reply.reply_text, "That mug looks great on your desk.");
        assert!(reply.is_risky);
        assert_eq!(reply.risk_reason.as_deref(), Some("political thread"));
    }

    #[tokio::test]
    async fn tolerates_code_fenced_json() {
        let generator = MockGenerator::with_response(
            "```json\n{\"replyText\": \"Nice find!\", \"isRisky\": false, \"riskReason\": null}\n```",
        );
        let synthesizer = ReplySynthesizer::new(generator, config());

        let reply = synthesizer.synthesize("love it", "Stoneware Mug", None).await;

        assert_eq!(reply.reply_text, "Nice find!");
        assert!(!reply.is_risky);
    }

    #[tokio::test]
    async fn malformed_output_is_used_verbatim_and_not_risky() {
        let generator = MockGenerator::with_response("Just a plain sentence, no JSON here.");
        let synthesizer = ReplySynthesizer::new(generator, config());

        let reply = synthesizer.synthesize("love it", "Stoneware Mug", None).await;

        assert_eq!(reply.reply_text, "Just a plain sentence, no JSON here.");
        assert!(!reply.is_risky);
        assert!(reply.risk_reason.is_none());
    }

    #[tokio::test]
    async fn sanitizes_links_and_hashtags_out_of_provider_output() {
        let generator = MockGenerator::with_response(
            r#"{"replyText": "Check https://evil.example/x out #spam #buy", "isRisky": false, "riskReason": null}"#,
        );
        let synthesizer = ReplySynthesizer::new(generator, config());

        let reply = synthesizer.synthesize("love it", "Stoneware Mug", None).await;

        assert_eq!(reply.reply_text, "Check out");
    }

    #[tokio::test]
    async fn provider_failure_yields_clean_fallback() {
        let generator = MockGenerator::failing();
        let synthesizer = ReplySynthesizer::new(generator, config());

        let reply = synthesizer.synthesize("love it", "Stoneware Mug", None).await;

        assert!(!reply.reply_text.is_empty());
        assert!(reply.reply_text.contains("Stoneware Mug"));
        assert!(!reply.reply_text.contains('#'));
        assert!(!reply.reply_text.contains("http"));
        assert!(!reply.is_risky);
    }

    #[tokio::test]
    async fn cta_branch_forced_on_appends_a_phrase() {
        let generator = MockGenerator::with_response(
            r#"{"replyText": "That mug looks great.", "isRisky": false, "riskReason": null}"#,
        );
        let synthesizer =
            ReplySynthesizer::new(generator, config().with_cta_probability(1.0));

        let reply = synthesizer.synthesize("love it", "Stoneware Mug", None).await;

        let lower = reply.reply_text.to_lowercase();
        assert!(
            lower.contains("profile") || lower.contains("bio"),
            "expected a CTA in: {}",
            reply.reply_text
        );
    }

    #[tokio::test]
    async fn cta_skipped_when_reply_already_mentions_profile() {
        let generator = MockGenerator::with_response(
            r#"{"replyText": "All the details are already in our bio.", "isRisky": false, "riskReason": null}"#,
        );
        let synthesizer =
            ReplySynthesizer::new(generator, config().with_cta_probability(1.0));

        let reply = synthesizer.synthesize("love it", "Stoneware Mug", None).await;

        assert_eq!(reply.reply_text, "All the details are already in our bio.");
    }

    #[tokio::test]
    async fn link_branch_forced_on_appends_the_short_link() {
        let generator = MockGenerator::with_response(
            r#"{"replyText": "That mug looks great.", "isRisky": false, "riskReason": null}"#,
        );
        let synthesizer =
            ReplySynthesizer::new(generator, config().with_link_probability(1.0));

        let reply = synthesizer
            .synthesize("love it", "Stoneware Mug", Some("https://sho.rt/abc"))
            .await;

        assert!(reply.reply_text.ends_with("https://sho.rt/abc"));
    }

    #[tokio::test]
    async fn link_branch_forced_off_leaves_reply_bare() {
        let generator = MockGenerator::with_response(
            r#"{"replyText": "That mug looks great.", "isRisky": false, "riskReason": null}"#,
        );
        let synthesizer = ReplySynthesizer::new(generator, config());

        let reply = synthesizer
            .synthesize("love it", "Stoneware Mug", Some("https://sho.rt/abc"))
            .await;

        assert_eq!(reply.reply_text, "That mug looks great.");
    }

    #[tokio::test]
    async fn prompt_carries_post_and_product_context() {
        let generator = MockGenerator::with_response(
            r#"{"replyText": "Nice!", "isRisky": false, "riskReason": null}"#,
        );
        let handle = generator.clone();
        let synthesizer = ReplySynthesizer::new(generator, config());

        synthesizer.synthesize("love this sale!", "Stoneware Mug", None).await;

        let prompts = handle.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("love this sale!"));
        assert!(prompts[0].contains("Stoneware Mug"));
    }

    #[tokio::test]
    async fn reply_is_truncated_to_the_configured_maximum() {
        let long_reply = format!(
            r#"{{"replyText": "{}", "isRisky": false, "riskReason": null}}"#,
            "so many words ".repeat(40).trim_end()
        );
        let generator = MockGenerator::with_response(long_reply);
        let synthesizer =
            ReplySynthesizer::new(generator, config().with_max_reply_chars(30));

        let reply = synthesizer.synthesize("love it", "Stoneware Mug", None).await;

        assert!(reply.reply_text.chars().count() <= 30);
        assert!(reply.reply_text.starts_with("so many words"));
        assert!(!reply.reply_text.ends_with(' '));
    }

    #[tokio::test]
    async fn no_link_supplied_means_no_link_injected() {
        let generator = MockGenerator::with_response(
            r#"{"replyText": "That mug looks great.", "isRisky": false, "riskReason": null}"#,
        );
        let synthesizer =
            ReplySynthesizer::new(generator, config().with_link_probability(1.0));

        let reply = synthesizer.synthesize("love it", "Stoneware Mug", None).await;

        assert_eq!(reply.reply_text, "That mug looks great.");
    }
}
