//! Batch runner
//!
//! The glue loop: load the collection, walk due posts through the
//! publisher one at a time, record successes, and persist once at the end
//! if anything changed. A failing post never halts the batch.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{info, trace};

use crate::error::Result;
use crate::publisher::{PublishOutcome, Publisher};
use crate::schedule;
use crate::store::PostStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Posts published this run
    pub published: usize,
    /// Due posts that failed and stay eligible for a future run
    pub failed: usize,
    /// Due posts skipped for having no image locators
    pub skipped: usize,
}

pub struct BatchRunner {
    store: PostStore,
    publisher: Publisher,
    timezone: Tz,
}

impl BatchRunner {
    pub fn new(store: PostStore, publisher: Publisher, timezone: Tz) -> Self {
        Self {
            store,
            publisher,
            timezone,
        }
    }

    /// Run one batch against the current wall clock.
    pub async fn run(&self) -> Result<BatchSummary> {
        self.run_at(Utc::now()).await
    }

    /// Run one batch as of `now`. The same instant drives due selection
    /// and every `posted_at` stamp in the run.
    ///
    /// # Errors
    ///
    /// Only store failures (missing or malformed posts file, failed save)
    /// are errors; per-post publish failures are counted in the summary.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<BatchSummary> {
        let mut collection = self.store.load()?;

        let mut summary = BatchSummary::default();
        let mut changed = false;

        for post in &mut collection.posts {
            if !schedule::is_due(post, now, self.timezone) {
                trace!(post = %post.name, "not due");
                continue;
            }

            if post.images.is_empty() {
                info!(post = %post.name, "no image locators, skipping");
                summary.skipped += 1;
                continue;
            }

            info!(
                post = %post.name,
                images = post.images.len(),
                carousel = post.is_carousel(),
                "publishing due post"
            );

            match self.publisher.publish_post(post).await {
                PublishOutcome::Published { .. } => {
                    if post.status.mark_posted(now) {
                        changed = true;
                    }
                    summary.published += 1;
                }
                // Already logged by the publisher; status stays unposted
                // so the post is retried next invocation
                PublishOutcome::Failed(_) => {
                    summary.failed += 1;
                }
            }
        }

        if changed {
            self.store.save(&collection)?;
        }

        info!(
            published = summary.published,
            failed = summary.failed,
            skipped = summary.skipped,
            "batch complete"
        );

        Ok(summary)
    }
}
