//! Publish orchestration
//!
//! Drives one post through the remote workflow: stage containers, wait
//! for media readiness, then issue the final publish call. Failures never
//! escape [`Publisher::publish_post`]; every one is logged and returned
//! as an inspectable [`PublishFailure`] so the batch loop continues with
//! ordinary control flow.

use tracing::{debug, info, warn};

use crate::api::PublishApi;
use crate::config::PollSettings;
use crate::error::ApiError;
use crate::readiness::{self, ReadinessFailure};
use crate::types::Post;

/// The Graph API rejects carousels beyond this many children.
pub const MAX_CAROUSEL_CHILDREN: usize = 10;

/// Why a post failed to publish this run. The post stays unposted and is
/// retried on a future invocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PublishFailure {
    #[error("carousel has {count} images, the API allows at most {max}")]
    TooManyImages { count: usize, max: usize },

    #[error("container creation failed: {0}")]
    Container(String),

    #[error("container {container_id} never became ready: {failure}")]
    Readiness {
        container_id: String,
        failure: ReadinessFailure,
    },

    #[error("publish call failed: {0}")]
    Publish(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Published { media_id: String },
    Failed(PublishFailure),
}

impl PublishOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, PublishOutcome::Published { .. })
    }
}

pub struct Publisher {
    api: Box<dyn PublishApi>,
    account_id: String,
    polling: PollSettings,
}

impl Publisher {
    pub fn new(api: Box<dyn PublishApi>, account_id: impl Into<String>, polling: PollSettings) -> Self {
        Self {
            api,
            account_id: account_id.into(),
            polling,
        }
    }

    /// Publish one post. Never fails past this boundary: any error in
    /// container creation, readiness, or the publish call is converted
    /// into `PublishOutcome::Failed` and logged.
    pub async fn publish_post(&self, post: &Post) -> PublishOutcome {
        match self.try_publish(post).await {
            Ok(media_id) => {
                info!(post = %post.name, media_id = %media_id, "published");
                PublishOutcome::Published { media_id }
            }
            Err(failure) => {
                warn!(post = %post.name, reason = %failure, "publish failed");
                PublishOutcome::Failed(failure)
            }
        }
    }

    async fn try_publish(&self, post: &Post) -> Result<String, PublishFailure> {
        let container_id = if post.is_carousel() {
            self.stage_carousel(post).await?
        } else {
            self.stage_single(post).await?
        };

        self.api
            .publish(&self.account_id, &container_id)
            .await
            .map_err(|e| PublishFailure::Publish(api_detail(e)))
    }

    async fn stage_single(&self, post: &Post) -> Result<String, PublishFailure> {
        let image_url = post
            .images
            .first()
            .ok_or_else(|| PublishFailure::Container("post has no image locators".to_string()))?;
        let caption = post.full_caption();

        let container_id = self
            .api
            .create_container(&self.account_id, image_url, Some(&caption), false)
            .await
            .map_err(|e| PublishFailure::Container(api_detail(e)))?;

        self.await_ready(&container_id).await?;
        Ok(container_id)
    }

    /// Stage a carousel: one child container per image, then one parent
    /// referencing them all. Children are created and awaited in order;
    /// the first readiness failure aborts the carousel and the remaining
    /// children are never awaited.
    async fn stage_carousel(&self, post: &Post) -> Result<String, PublishFailure> {
        if post.images.len() > MAX_CAROUSEL_CHILDREN {
            return Err(PublishFailure::TooManyImages {
                count: post.images.len(),
                max: MAX_CAROUSEL_CHILDREN,
            });
        }

        let mut children = Vec::with_capacity(post.images.len());
        for image_url in &post.images {
            let child = self
                .api
                .create_container(&self.account_id, image_url, None, true)
                .await
                .map_err(|e| PublishFailure::Container(api_detail(e)))?;
            children.push(child);
        }

        for child in &children {
            self.await_ready(child).await?;
        }
        debug!(post = %post.name, children = children.len(), "carousel children ready");

        let caption = post.full_caption();
        let parent = self
            .api
            .create_carousel_container(&self.account_id, &children, &caption)
            .await
            .map_err(|e| PublishFailure::Container(api_detail(e)))?;

        self.await_ready(&parent).await?;
        Ok(parent)
    }

    async fn await_ready(&self, container_id: &str) -> Result<(), PublishFailure> {
        readiness::await_ready(self.api.as_ref(), container_id, &self.polling)
            .await
            .map_err(|failure| PublishFailure::Readiness {
                container_id: container_id.to_string(),
                failure,
            })
    }
}

fn api_detail(error: crate::error::GramcastError) -> String {
    match error {
        crate::error::GramcastError::Api(ApiError::Remote { message, .. }) => message,
        other => other.to_string(),
    }
}
