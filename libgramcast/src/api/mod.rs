//! Publishing API abstraction
//!
//! The remote API stages every media item in a server-side container that
//! must finish asynchronous processing before it can be published. This
//! module defines the client seam used by the orchestrator and poller;
//! `graph` talks to the real endpoint and `mock` replaces it in tests.

use async_trait::async_trait;

use crate::error::Result;

pub mod graph;

// Mock API is available for all builds to support integration tests
pub mod mock;

pub use graph::GraphClient;
pub use mock::MockApi;

/// Processing state reported for a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusCode {
    /// Processing finished, the container is publishable
    Finished,
    /// Terminal failure, the container will never become publishable
    Error,
    /// Still processing
    InProgress,
    /// A code this client does not know; treated as still-processing so a
    /// new terminal state degrades to a poll timeout rather than a wrong
    /// success
    Other(String),
}

impl StatusCode {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "FINISHED" => StatusCode::Finished,
            "ERROR" => StatusCode::Error,
            "IN_PROGRESS" => StatusCode::InProgress,
            other => StatusCode::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusCode::Finished => write!(f, "FINISHED"),
            StatusCode::Error => write!(f, "ERROR"),
            StatusCode::InProgress => write!(f, "IN_PROGRESS"),
            StatusCode::Other(raw) => write!(f, "{}", raw),
        }
    }
}

/// One status poll result: the processing state plus any remote-supplied
/// detail message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerStatus {
    pub code: StatusCode,
    pub detail: Option<String>,
}

impl ContainerStatus {
    pub fn finished() -> Self {
        Self {
            code: StatusCode::Finished,
            detail: None,
        }
    }

    pub fn in_progress() -> Self {
        Self {
            code: StatusCode::InProgress,
            detail: None,
        }
    }

    pub fn error(detail: &str) -> Self {
        Self {
            code: StatusCode::Error,
            detail: Some(detail.to_string()),
        }
    }
}

/// Client seam for the remote publishing API.
///
/// All calls carry the account's bearer credential; implementations hold
/// it themselves. Errors are transport or remote failures; whether a
/// failure is fatal for a post is decided by the caller.
#[async_trait]
pub trait PublishApi: Send + Sync {
    /// Create a media container for one image. `carousel_item` marks the
    /// container as a carousel child; children carry no caption of their
    /// own.
    async fn create_container(
        &self,
        account_id: &str,
        image_url: &str,
        caption: Option<&str>,
        carousel_item: bool,
    ) -> Result<String>;

    /// Create the parent container of a carousel from finished children.
    async fn create_carousel_container(
        &self,
        account_id: &str,
        children: &[String],
        caption: &str,
    ) -> Result<String>;

    /// Publish a finished container. Returns the published media id.
    async fn publish(&self, account_id: &str, container_id: &str) -> Result<String>;

    /// Fetch the current processing status of a container.
    async fn container_status(&self, container_id: &str) -> Result<ContainerStatus>;
}
