//! Ingestion and enrichment stage.
//!
//! Consumes one discovered post at a time, enriches it with campaign and
//! product context, resolves a short link, synthesizes a reply, and emits
//! exactly one suggestion downstream. Unrecoverable failures route the
//! original event to the dead-letter stream; the event is acknowledged in
//! every case, so a poisoned message never blocks the consumer group.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use crate::error::Result;
use crate::reply::ReplySynthesizer;
use crate::shortlink::ShortLinkResolver;
use crate::traits::stream::subjects;
use crate::traits::{
    CampaignSource, EventPublisher, ProductSource, ShortLinkStore, TextGenerator,
};
use crate::types::{DiscoveredPost, ReplySuggestion};

/// How the stage disposed of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Campaign no longer exists; event handled as a no-op.
    CampaignMissing,

    /// Campaign's product no longer exists; event handled as a no-op.
    ProductMissing,

    /// A reply suggestion was published downstream.
    Suggested,

    /// Processing failed; the original event went to the dead-letter
    /// stream (or was dropped there with an error logged).
    DeadLettered,
}

/// The ingestion stage, wired with its collaborators at construction.
pub struct IngestStage<C, P, S, G>
where
    C: CampaignSource,
    P: ProductSource,
    S: ShortLinkStore,
    G: TextGenerator,
{
    campaigns: C,
    products: P,
    resolver: ShortLinkResolver<S>,
    synthesizer: ReplySynthesizer<G>,
    publisher: Arc<dyn EventPublisher>,
}

impl<C, P, S, G> IngestStage<C, P, S, G>
where
    C: CampaignSource,
    P: ProductSource,
    S: ShortLinkStore,
    G: TextGenerator,
{
    pub fn new(
        campaigns: C,
        products: P,
        resolver: ShortLinkResolver<S>,
        synthesizer: ReplySynthesizer<G>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            campaigns,
            products,
            resolver,
            synthesizer,
            publisher,
        }
    }

    /// Process one discovered post. Always returns `Ok`: every failure
    /// mode resolves to a skipped event, a published suggestion, or a
    /// quarantined event, and the caller acknowledges in all cases.
    pub async fn process(&self, post: &DiscoveredPost) -> Result<IngestOutcome> {
        match self.enrich(post).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!(
                    post_id = %post.post_id,
                    error = %e,
                    "unrecoverable ingest failure, routing to dead letter"
                );
                self.dead_letter(post).await;
                Ok(IngestOutcome::DeadLettered)
            }
        }
    }

    async fn enrich(&self, post: &DiscoveredPost) -> Result<IngestOutcome> {
        let Some(campaign) = self.campaigns.campaign(post.campaign_id).await? else {
            info!(
                post_id = %post.post_id,
                campaign_id = post.campaign_id,
                "campaign not found, skipping post"
            );
            return Ok(IngestOutcome::CampaignMissing);
        };

        let Some(product) = self.products.product(campaign.product_id).await? else {
            info!(
                post_id = %post.post_id,
                campaign_id = campaign.id,
                product_id = campaign.product_id,
                "product not found, skipping post"
            );
            return Ok(IngestOutcome::ProductMissing);
        };

        let short_link = if product.product_url.is_empty() {
            None
        } else {
            Some(
                self.resolver
                    .resolve(&product.product_url, Some(product.id), campaign.id)
                    .await,
            )
        };

        let synthesized = self
            .synthesizer
            .synthesize(&post.text, &product.title, short_link.as_deref())
            .await;

        let suggestion = ReplySuggestion {
            post_id: post.post_id.clone(),
            campaign_id: campaign.id,
            reply_text: synthesized.reply_text,
            confidence: self.synthesizer.config().confidence,
            short_link,
            post_author: post.author.clone(),
            post_text: post.text.clone(),
            post_url: post.url.clone(),
            mode: campaign.mode.unwrap_or_default(),
            is_risky: synthesized.is_risky,
            risk_reason: synthesized.risk_reason,
            created_at: Utc::now(),
        };

        let subject = subjects::keyed(subjects::REPLIES_SUGGESTED, &post.post_id);
        let payload = serde_json::to_vec(&suggestion)?;
        self.publisher.publish(subject, payload.into()).await?;

        info!(
            post_id = %post.post_id,
            campaign_id = campaign.id,
            risky = suggestion.is_risky,
            "published reply suggestion"
        );
        Ok(IngestOutcome::Suggested)
    }

    /// Republish the original event to the quarantine stream. A failure
    /// here is logged and swallowed: forward progress wins over retaining
    /// the poisoned message.
    async fn dead_letter(&self, post: &DiscoveredPost) {
        let subject = subjects::keyed(subjects::DEAD_LETTER, &post.post_id);
        match serde_json::to_vec(post) {
            Ok(payload) => {
                if let Err(e) = self.publisher.publish(subject, payload.into()).await {
                    error!(
                        post_id = %post.post_id,
                        error = %e,
                        "failed to publish to dead-letter stream, dropping event"
                    );
                }
            }
            Err(e) => {
                error!(post_id = %post.post_id, error = %e, "failed to serialize dead-letter event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SynthesizerConfig;
    use crate::stores::MemoryStore;
    use crate::testing::{
        auto_campaign, product, CapturePublisher, MockCampaigns, MockGenerator, MockProducts,
    };
    use crate::types::CampaignMode;

    fn post(post_id: &str, campaign_id: i64) -> DiscoveredPost {
        DiscoveredPost {
            post_id: post_id.to_string(),
            campaign_id,
            author: "craftfan".to_string(),
            text: "love this sale!".to_string(),
            url: format!("https://social.example/p/{post_id}"),
            likes: Some(3),
            reposts: None,
            language: Some("en".to_string()),
            created_at: Utc::now(),
        }
    }

    fn synthesizer(generator: MockGenerator) -> ReplySynthesizer<MockGenerator> {
        ReplySynthesizer::new(
            generator,
            SynthesizerConfig::default()
                .with_cta_probability(0.0)
                .with_link_probability(0.0),
        )
    }

    fn stage(
        campaigns: MockCampaigns,
        products: MockProducts,
        publisher: Arc<CapturePublisher>,
    ) -> IngestStage<MockCampaigns, MockProducts, MemoryStore, MockGenerator> {
        IngestStage::new(
            campaigns,
            products,
            ShortLinkResolver::new(MemoryStore::new()),
            synthesizer(MockGenerator::with_response(
                r#"{"replyText": "So glad you like it!", "isRisky": false, "riskReason": null}"#,
            )),
            publisher,
        )
    }

    #[tokio::test]
    async fn discovered_post_yields_exactly_one_suggestion() {
        let publisher = Arc::new(CapturePublisher::new());
        let stage = stage(
            MockCampaigns::new().with_campaign(auto_campaign(5, 9)),
            MockProducts::new().with_product(product(9)),
            publisher.clone(),
        );

        let outcome = stage.process(&post("t1", 5)).await.unwrap();

        assert_eq!(outcome, IngestOutcome::Suggested);
        let events = publisher.published();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].subject, "replies.suggested.t1");

        let suggestion: ReplySuggestion = serde_json::from_slice(&events[0].payload).unwrap();
        assert_eq!(suggestion.post_id, "t1");
        assert_eq!(suggestion.campaign_id, 5);
        assert_eq!(suggestion.mode, CampaignMode::Auto);
        assert_eq!(suggestion.reply_text, "So glad you like it!");
        assert_eq!(suggestion.confidence, 0.85);
        assert!(suggestion.short_link.is_some());
    }

    #[tokio::test]
    async fn missing_campaign_is_a_silent_no_op() {
        let publisher = Arc::new(CapturePublisher::new());
        let stage = stage(MockCampaigns::new(), MockProducts::new(), publisher.clone());

        let outcome = stage.process(&post("t1", 404)).await.unwrap();

        assert_eq!(outcome, IngestOutcome::CampaignMissing);
        assert!(publisher.published().is_empty());
    }

    #[tokio::test]
    async fn missing_product_is_a_silent_no_op() {
        let publisher = Arc::new(CapturePublisher::new());
        let stage = stage(
            MockCampaigns::new().with_campaign(auto_campaign(5, 9)),
            MockProducts::new(),
            publisher.clone(),
        );

        let outcome = stage.process(&post("t1", 5)).await.unwrap();

        assert_eq!(outcome, IngestOutcome::ProductMissing);
        assert!(publisher.published().is_empty());
    }

    #[tokio::test]
    async fn context_failure_routes_original_event_to_dead_letter() {
        let publisher = Arc::new(CapturePublisher::new());
        let stage = stage(MockCampaigns::failing(), MockProducts::new(), publisher.clone());

        let original = post("t1", 5);
        let outcome = stage.process(&original).await.unwrap();

        assert_eq!(outcome, IngestOutcome::DeadLettered);
        let quarantined = publisher.published_with_prefix("deadletter.posts.");
        assert_eq!(quarantined.len(), 1);
        assert_eq!(quarantined[0].subject, "deadletter.posts.t1");

        let replayed: DiscoveredPost = serde_json::from_slice(&quarantined[0].payload).unwrap();
        assert_eq!(replayed.post_id, original.post_id);
        assert_eq!(replayed.text, original.text);
    }

    #[tokio::test]
    async fn product_lookup_failure_routes_to_dead_letter() {
        let publisher = Arc::new(CapturePublisher::new());
        let stage = stage(
            MockCampaigns::new().with_campaign(auto_campaign(5, 9)),
            MockProducts::failing(),
            publisher.clone(),
        );

        let outcome = stage.process(&post("t1", 5)).await.unwrap();

        assert_eq!(outcome, IngestOutcome::DeadLettered);
        assert_eq!(publisher.published_with_prefix("deadletter.posts.").len(), 1);
    }

    #[tokio::test]
    async fn suggestion_publish_failure_dead_letters_the_post() {
        let publisher =
            Arc::new(CapturePublisher::new().failing_for(subjects::REPLIES_SUGGESTED));
        let stage = stage(
            MockCampaigns::new().with_campaign(auto_campaign(5, 9)),
            MockProducts::new().with_product(product(9)),
            publisher.clone(),
        );

        let outcome = stage.process(&post("t1", 5)).await.unwrap();

        assert_eq!(outcome, IngestOutcome::DeadLettered);
        assert_eq!(publisher.published_with_prefix("deadletter.posts.").len(), 1);
        assert!(publisher
            .published_with_prefix(subjects::REPLIES_SUGGESTED)
            .is_empty());
    }

    #[tokio::test]
    async fn dead_letter_publish_failure_still_resolves_the_event() {
        // Both streams down: the event is dropped with an error logged,
        // never redelivered forever
        let publisher = Arc::new(
            CapturePublisher::new()
                .failing_for(subjects::REPLIES_SUGGESTED)
                .failing_for(subjects::DEAD_LETTER),
        );
        let stage = stage(
            MockCampaigns::new().with_campaign(auto_campaign(5, 9)),
            MockProducts::new().with_product(product(9)),
            publisher.clone(),
        );

        let outcome = stage.process(&post("t1", 5)).await.unwrap();

        assert_eq!(outcome, IngestOutcome::DeadLettered);
        assert!(publisher.published().is_empty());
    }

    #[tokio::test]
    async fn provider_failure_still_produces_a_suggestion() {
        let publisher = Arc::new(CapturePublisher::new());
        let stage = IngestStage::new(
            MockCampaigns::new().with_campaign(auto_campaign(5, 9)),
            MockProducts::new().with_product(product(9)),
            ShortLinkResolver::new(MemoryStore::new()),
            synthesizer(MockGenerator::failing()),
            publisher.clone(),
        );

        let outcome = stage.process(&post("t1", 5)).await.unwrap();

        assert_eq!(outcome, IngestOutcome::Suggested);
        let events = publisher.published_with_prefix(subjects::REPLIES_SUGGESTED);
        assert_eq!(events.len(), 1);

        let suggestion: ReplySuggestion = serde_json::from_slice(&events[0].payload).unwrap();
        assert!(!suggestion.reply_text.is_empty());
        assert!(!suggestion.is_risky);
    }
}
