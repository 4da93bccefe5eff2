//! Core types for Gramcast
//!
//! The on-disk post collection is a single JSON document with a top-level
//! `posts` array. Records are validated on load: required fields missing or
//! malformed fail the whole batch up front rather than deep inside the
//! publish loop.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// The persisted post collection, as stored in the posts file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostCollection {
    pub posts: Vec<Post>,
}

/// A scheduled publication unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Opaque identifier, used for logging and correlation only.
    pub name: String,

    /// Scheduled publication date in the configured timezone.
    pub publish_date: NaiveDate,

    /// Optional time of day; start-of-day when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_time: Option<NaiveTime>,

    pub caption: String,

    #[serde(default)]
    pub hashtags: Vec<String>,

    /// Ordered image URLs. One image publishes as a single post, two or
    /// more as a carousel. Empty means the record is incomplete and the
    /// post is skipped.
    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    pub status: PublishState,
}

impl Post {
    /// Caption text sent to the API: the caption followed by a blank line
    /// and the `#`-prefixed hashtags joined by single spaces.
    pub fn full_caption(&self) -> String {
        if self.hashtags.is_empty() {
            return self.caption.clone();
        }

        let tags = self
            .hashtags
            .iter()
            .map(|tag| format!("#{}", tag))
            .collect::<Vec<_>>()
            .join(" ");

        format!("{}\n\n{}", self.caption, tags)
    }

    pub fn is_carousel(&self) -> bool {
        self.images.len() > 1
    }
}

/// Mutable publication state of a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishState {
    pub posted: bool,

    /// Set exactly once, at the first successful publish. Never cleared.
    #[serde(default)]
    pub posted_at: Option<DateTime<Utc>>,
}

impl Default for PublishState {
    fn default() -> Self {
        Self {
            posted: false,
            posted_at: None,
        }
    }
}

impl PublishState {
    /// Record a successful publish. Returns `true` if this call performed
    /// the `false -> true` transition; a post that is already published is
    /// left untouched.
    pub fn mark_posted(&mut self, at: DateTime<Utc>) -> bool {
        if self.posted {
            return false;
        }
        self.posted = true;
        self.posted_at = Some(at);
        true
    }
}
