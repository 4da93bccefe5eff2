//! Gramcast - batch publisher for scheduled image posts
//!
//! This library drives one batch of scheduled posts through the Graph-style
//! publishing API: it loads the post collection, selects the posts that are
//! due, walks each one through container creation and media readiness, and
//! persists publication state so no post is ever published twice.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod publisher;
pub mod readiness;
pub mod runner;
pub mod schedule;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use api::{ContainerStatus, PublishApi, StatusCode};
pub use config::Config;
pub use error::{GramcastError, Result};
pub use publisher::{PublishFailure, PublishOutcome, Publisher};
pub use runner::{BatchRunner, BatchSummary};
pub use store::PostStore;
pub use types::{Post, PostCollection, PublishState};
