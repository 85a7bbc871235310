//! Testing utilities including mock implementations.
//!
//! These make every pipeline stage testable without a live campaign
//! service, text-generation provider, shortening provider, or broker.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{EngagementError, Result, ShortenError};
use crate::traits::{
    CampaignSource, EventPublisher, LinkShortener, ProductSource, TextGenerator,
};
use crate::types::{CampaignContext, CampaignMode, ProductContext};

/// A campaign source backed by a map. Unknown ids are absent; `failing()`
/// simulates a transport error on every lookup.
#[derive(Default)]
pub struct MockCampaigns {
    campaigns: HashMap<i64, CampaignContext>,
    fail: bool,
}

impl MockCampaigns {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source whose every lookup errors.
    pub fn failing() -> Self {
        Self {
            campaigns: HashMap::new(),
            fail: true,
        }
    }

    /// Add a campaign.
    pub fn with_campaign(mut self, campaign: CampaignContext) -> Self {
        self.campaigns.insert(campaign.id, campaign);
        self
    }
}

#[async_trait]
impl CampaignSource for MockCampaigns {
    async fn campaign(&self, id: i64) -> Result<Option<CampaignContext>> {
        if self.fail {
            return Err(EngagementError::Context("mock campaign lookup failed".into()));
        }
        Ok(self.campaigns.get(&id).cloned())
    }
}

/// A product source backed by a map, mirroring [`MockCampaigns`].
#[derive(Default)]
pub struct MockProducts {
    products: HashMap<i64, ProductContext>,
    fail: bool,
}

impl MockProducts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            products: HashMap::new(),
            fail: true,
        }
    }

    pub fn with_product(mut self, product: ProductContext) -> Self {
        self.products.insert(product.id, product);
        self
    }
}

#[async_trait]
impl ProductSource for MockProducts {
    async fn product(&self, id: i64) -> Result<Option<ProductContext>> {
        if self.fail {
            return Err(EngagementError::Context("mock product lookup failed".into()));
        }
        Ok(self.products.get(&id).cloned())
    }
}

/// A text generator that returns a fixed response, or fails.
///
/// Cloning shares the prompt log, so a test can keep a handle for
/// assertions after moving the mock into a synthesizer.
#[derive(Clone, Default)]
pub struct MockGenerator {
    response: Option<String>,
    fail: bool,
    prompts: Arc<RwLock<Vec<String>>>,
}

impl MockGenerator {
    /// Return `response` for every call.
    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
            ..Default::default()
        }
    }

    /// Fail every call, as an unreachable provider would.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// Prompts seen so far, for assertions.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, _system: &str, prompt: &str) -> Result<String> {
        self.prompts
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(prompt.to_string());

        if self.fail {
            return Err(EngagementError::Generation("mock provider unreachable".into()));
        }
        Ok(self.response.clone().unwrap_or_default())
    }
}

/// A shortener that always returns the same short URL.
pub struct FixedShortener {
    short_url: String,
}

impl FixedShortener {
    pub fn new(short_url: impl Into<String>) -> Self {
        Self {
            short_url: short_url.into(),
        }
    }
}

#[async_trait]
impl LinkShortener for FixedShortener {
    async fn shorten(&self, _long_url: &str) -> std::result::Result<String, ShortenError> {
        Ok(self.short_url.clone())
    }
}

/// A shortener that always fails, as a down provider would.
pub struct FailingShortener;

#[async_trait]
impl LinkShortener for FailingShortener {
    async fn shorten(&self, _long_url: &str) -> std::result::Result<String, ShortenError> {
        Err(ShortenError::BadResponse("mock provider down".into()))
    }
}

/// A published message captured by [`CapturePublisher`].
#[derive(Debug, Clone)]
pub struct PublishedEvent {
    pub subject: String,
    pub payload: Bytes,
}

/// Publisher that records messages instead of sending them, in the shape
/// of the real broker publisher. Subjects can be made to fail by prefix
/// to exercise dead-letter routing.
#[derive(Default)]
pub struct CapturePublisher {
    published: RwLock<Vec<PublishedEvent>>,
    fail_prefixes: Vec<String>,
}

impl CapturePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any publish whose subject starts with `prefix`.
    pub fn failing_for(mut self, prefix: impl Into<String>) -> Self {
        self.fail_prefixes.push(prefix.into());
        self
    }

    /// All captured events.
    pub fn published(&self) -> Vec<PublishedEvent> {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Captured events whose subject starts with `prefix`.
    pub fn published_with_prefix(&self, prefix: &str) -> Vec<PublishedEvent> {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|event| event.subject.starts_with(prefix))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventPublisher for CapturePublisher {
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()> {
        if self
            .fail_prefixes
            .iter()
            .any(|prefix| subject.starts_with(prefix.as_str()))
        {
            return Err(EngagementError::Publish("mock publish failure".into()));
        }

        self.published
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(PublishedEvent { subject, payload });
        Ok(())
    }
}

/// A campaign in `AUTO` mode pointing at the given product.
pub fn auto_campaign(id: i64, product_id: i64) -> CampaignContext {
    CampaignContext {
        id,
        name: format!("campaign-{id}"),
        product_id,
        status: "ACTIVE".to_string(),
        mode: Some(CampaignMode::Auto),
        hashtags: vec!["#handmade".to_string()],
        keywords: vec!["mug".to_string()],
    }
}

/// A minimal product with a canonical URL.
pub fn product(id: i64) -> ProductContext {
    ProductContext {
        id,
        title: "Stoneware Mug".to_string(),
        description: Some("Hand-thrown stoneware mug".to_string()),
        product_url: format!("https://shop.example/products/{id}"),
        price: Some(34.0),
        category: Some("kitchen".to_string()),
        image_url: None,
    }
}
