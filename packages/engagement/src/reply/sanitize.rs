//! Deterministic text scrubbing for generated replies.
//!
//! Hard constraints (no links, no hashtags, bounded length) are enforced
//! here regardless of what the generative provider returns.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Explicit URLs: scheme or www prefix
    static ref URL_REGEX: Regex = Regex::new(
        r"(?i)\bhttps?://\S+|\bwww\.\S+"
    ).unwrap();

    // Bare domain-like tokens: label(s) + a common TLD, optional path
    static ref DOMAIN_REGEX: Regex = Regex::new(
        r"(?i)\b[a-z0-9-]+(?:\.[a-z0-9-]+)*\.(?:com|net|org|io|co|ly|me|app|shop|store)(?:/\S*)?\b"
    ).unwrap();

    // Hashtag tokens
    static ref HASHTAG_REGEX: Regex = Regex::new(r"#\w+").unwrap();

    static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").unwrap();
}

/// Scrub a reply: strip URLs, bare domains, and hashtags; collapse
/// whitespace; truncate to `max_chars` at a word boundary.
///
/// The pipeline repeats until the text is stable, so a removal can never
/// splice the remaining halves into a new link or hashtag.
pub fn sanitize(text: &str, max_chars: usize) -> String {
    let mut current = text.to_string();
    loop {
        let mut pass = strip_patterns(&current);
        pass = WHITESPACE_REGEX.replace_all(&pass, " ").trim().to_string();
        pass = truncate_at_word(&pass, max_chars);
        if pass == current {
            return current;
        }
        current = pass;
    }
}

fn strip_patterns(text: &str) -> String {
    let stripped = URL_REGEX.replace_all(text, "");
    let stripped = DOMAIN_REGEX.replace_all(&stripped, "");
    HASHTAG_REGEX.replace_all(&stripped, "").into_owned()
}

/// Truncate to at most `max_chars` characters, preferring the last word
/// boundary before the cut. A single over-long word is hard-cut.
fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let mut rest = text.chars();
    let cut: String = rest.by_ref().take(max_chars).collect();

    // A cut landing exactly on a word end is already a boundary
    if matches!(rest.next(), Some(c) if c.is_whitespace()) {
        return cut.trim_end().to_string();
    }

    match cut.rfind(' ') {
        Some(idx) => cut[..idx].trim_end().to_string(),
        None => cut,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MAX: usize = 240;

    #[test]
    fn strips_urls() {
        assert_eq!(
            sanitize("check this https://shop.example/p/1 out", MAX),
            "check this out"
        );
        assert_eq!(sanitize("see www.example.com now", MAX), "see now");
    }

    #[test]
    fn strips_bare_domains() {
        assert_eq!(sanitize("visit craftly.shop for more", MAX), "visit for more");
        assert_eq!(sanitize("we are on etsy.com", MAX), "we are on");
    }

    #[test]
    fn strips_hashtags() {
        assert_eq!(sanitize("so cozy #handmade #ShopSmall", MAX), "so cozy");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(sanitize("too   many\n\nspaces", MAX), "too many spaces");
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(
            sanitize("This mug keeps coffee warm for hours.", MAX),
            "This mug keeps coffee warm for hours."
        );
    }

    #[test]
    fn truncates_at_word_boundary() {
        let text = "one two three four five";
        assert_eq!(sanitize(text, 13), "one two three");
        assert_eq!(sanitize(text, 12), "one two");
    }

    #[test]
    fn hard_cuts_a_single_overlong_word() {
        let text = "a".repeat(50);
        assert_eq!(sanitize(&text, 10), "a".repeat(10));
    }

    #[test]
    fn splice_cannot_reassemble_a_hashtag_or_url() {
        // Removing "#xtps" would otherwise leave "ht" + "://x" adjacent
        let out = sanitize("ht#xtps://x", MAX);
        assert!(!URL_REGEX.is_match(&out));
        let out = sanitize("y#x.com", MAX);
        assert!(!DOMAIN_REGEX.is_match(&out));
    }

    proptest! {
        #[test]
        fn output_never_contains_url_or_hashtag(input in ".{0,500}") {
            let out = sanitize(&input, MAX);
            prop_assert!(!URL_REGEX.is_match(&out));
            prop_assert!(!DOMAIN_REGEX.is_match(&out));
            prop_assert!(!HASHTAG_REGEX.is_match(&out));
        }

        #[test]
        fn output_never_exceeds_max_chars(input in ".{0,500}", max in 1usize..300) {
            let out = sanitize(&input, max);
            prop_assert!(out.chars().count() <= max);
        }
    }
}
