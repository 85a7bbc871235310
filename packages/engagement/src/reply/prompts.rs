//! Prompts for reply generation.
//!
//! The provider is asked for structured JSON, but its output is untrusted:
//! the safety pipeline in [`super::sanitize`] enforces the hard
//! constraints regardless of what comes back.

/// System prompt defining the generator's persona.
pub const SYSTEM_PROMPT: &str = "You are a thoughtful social media voice for a small maker \
brand. Your replies are authentic, helpful, and conversational. You engage with people \
genuinely and mention products only when it adds to the conversation. Never use corporate \
language or obvious advertising tactics.";

/// User prompt template for reply generation with risk analysis.
const REPLY_PROMPT: &str = r#"Post: "{post_text}"

Product: "{product_title}"

First decide whether the post is risky or controversial to reply to as a brand
(politics, tragedy, harassment, medical or financial advice, anything divisive).

Then write a reply.

Rules:
- Sound human, friendly, and conversational
- Mention the product naturally and casually, or not at all
- Do NOT include any links or URLs
- Do NOT include any hashtags
- Keep it under {char_window} characters
- You may end with a soft nudge toward our profile, but no more than that
- Add value to the conversation, don't sell

Output JSON only:
{
    "replyText": "the reply",
    "isRisky": true or false,
    "riskReason": "short justification if risky, otherwise null"
}"#;

/// Build the user prompt for a post/product pair.
pub fn reply_prompt(post_text: &str, product_title: &str, char_window: usize) -> String {
    REPLY_PROMPT
        .replace("{post_text}", post_text)
        .replace("{product_title}", product_title)
        .replace("{char_window}", &char_window.to_string())
}
