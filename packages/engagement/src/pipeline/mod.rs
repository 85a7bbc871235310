//! The two-stage event pipeline.
//!
//! Stage one ([`ingest`]) turns a discovered post into a reply suggestion;
//! stage two ([`persist`]) turns a suggestion into a reviewable task.

pub mod ingest;
pub mod persist;

pub use ingest::{IngestOutcome, IngestStage};
pub use persist::{PersistOutcome, PersistStage};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use crate::config::SynthesizerConfig;
    use crate::reply::ReplySynthesizer;
    use crate::shortlink::ShortLinkResolver;
    use crate::stores::MemoryStore;
    use crate::testing::{
        auto_campaign, product, CapturePublisher, MockCampaigns, MockGenerator, MockProducts,
    };
    use crate::traits::stream::subjects;
    use crate::types::{CampaignMode, DiscoveredPost, ReplySuggestion, TaskStatus};

    #[tokio::test]
    async fn discovered_post_flows_through_both_stages_into_a_pending_task() {
        let publisher = Arc::new(CapturePublisher::new());
        let ingest = IngestStage::new(
            MockCampaigns::new().with_campaign(auto_campaign(5, 9)),
            MockProducts::new().with_product(product(9)),
            ShortLinkResolver::new(MemoryStore::new()),
            ReplySynthesizer::new(
                MockGenerator::with_response(
                    r#"{"replyText": "So glad you like it!", "isRisky": false, "riskReason": null}"#,
                ),
                SynthesizerConfig::default()
                    .with_cta_probability(0.0)
                    .with_link_probability(0.0),
            ),
            publisher.clone(),
        );

        let post = DiscoveredPost {
            post_id: "t1".to_string(),
            campaign_id: 5,
            author: "craftfan".to_string(),
            text: "love this sale!".to_string(),
            url: "https://social.example/p/t1".to_string(),
            likes: None,
            reposts: None,
            language: None,
            created_at: Utc::now(),
        };

        let outcome = ingest.process(&post).await.unwrap();
        assert_eq!(outcome, IngestOutcome::Suggested);

        // Feed the emitted suggestion into the persistence stage, as the
        // downstream consumer would
        let events = publisher.published_with_prefix(subjects::REPLIES_SUGGESTED);
        assert_eq!(events.len(), 1);
        let suggestion: ReplySuggestion = serde_json::from_slice(&events[0].payload).unwrap();

        let store = Arc::new(MemoryStore::new());
        let persist = PersistStage::new(store.clone());

        let outcome = persist.process(&suggestion).await.unwrap();
        let PersistOutcome::Created(task) = outcome else {
            panic!("expected a created task");
        };
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.mode, CampaignMode::Auto);
        assert_eq!(task.post_id, "t1");

        // Redelivery of the same suggestion is absorbed
        let replay = persist.process(&suggestion).await.unwrap();
        assert_eq!(replay, PersistOutcome::Duplicate);
        assert_eq!(store.task_count(), 1);
    }
}
