//! Mock publishing API for testing
//!
//! A configurable in-memory [`PublishApi`] that records every call and
//! replays scripted container statuses, so orchestrator and batch tests
//! run without network access. Clones share state, letting a test keep a
//! handle for inspection after handing the mock to the publisher.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::api::{ContainerStatus, PublishApi};
use crate::error::{ApiError, Result};

/// Record of a `create_container` call.
#[derive(Debug, Clone)]
pub struct CreatedContainer {
    pub id: String,
    pub image_url: String,
    pub caption: Option<String>,
    pub carousel_item: bool,
}

/// Record of a `create_carousel_container` call.
#[derive(Debug, Clone)]
pub struct CreatedCarousel {
    pub id: String,
    pub children: Vec<String>,
    pub caption: String,
}

#[derive(Default)]
struct State {
    /// Status sequences handed to containers in creation order. A
    /// container with no script finishes on its first poll.
    scripts: VecDeque<Vec<ContainerStatus>>,
    statuses: HashMap<String, VecDeque<ContainerStatus>>,
    containers: Vec<CreatedContainer>,
    carousels: Vec<CreatedCarousel>,
    published: Vec<String>,
    status_polls: usize,
    fail_create: Option<String>,
    fail_carousel: Option<String>,
    fail_publish: Option<String>,
}

#[derive(Clone, Default)]
pub struct MockApi {
    state: Arc<Mutex<State>>,
}

impl MockApi {
    /// A mock where every container finishes on its first status poll.
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock whose `create_container` calls fail with the given message.
    pub fn failing_create(message: &str) -> Self {
        let mock = Self::new();
        mock.state.lock().unwrap().fail_create = Some(message.to_string());
        mock
    }

    /// A mock whose carousel parent creation fails.
    pub fn failing_carousel(message: &str) -> Self {
        let mock = Self::new();
        mock.state.lock().unwrap().fail_carousel = Some(message.to_string());
        mock
    }

    /// A mock whose publish calls fail.
    pub fn failing_publish(message: &str) -> Self {
        let mock = Self::new();
        mock.state.lock().unwrap().fail_publish = Some(message.to_string());
        mock
    }

    /// Queue the status sequence for the next container created
    /// (including carousel parents). Once a sequence runs out its last
    /// status keeps repeating.
    pub fn push_status_script(&self, script: Vec<ContainerStatus>) {
        self.state.lock().unwrap().scripts.push_back(script);
    }

    pub fn created_containers(&self) -> Vec<CreatedContainer> {
        self.state.lock().unwrap().containers.clone()
    }

    pub fn created_carousels(&self) -> Vec<CreatedCarousel> {
        self.state.lock().unwrap().carousels.clone()
    }

    pub fn published(&self) -> Vec<String> {
        self.state.lock().unwrap().published.clone()
    }

    pub fn status_polls(&self) -> usize {
        self.state.lock().unwrap().status_polls
    }

    /// Total remote calls of any kind, for no-contact assertions.
    pub fn total_calls(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.containers.len()
            + state.carousels.len()
            + state.published.len()
            + state.status_polls
    }

    fn register_container(state: &mut State, id: &str) {
        let script = state
            .scripts
            .pop_front()
            .unwrap_or_else(|| vec![ContainerStatus::finished()]);
        state.statuses.insert(id.to_string(), script.into());
    }
}

fn remote_error(message: &str) -> ApiError {
    ApiError::Remote {
        status: 400,
        message: message.to_string(),
    }
}

#[async_trait]
impl PublishApi for MockApi {
    async fn create_container(
        &self,
        _account_id: &str,
        image_url: &str,
        caption: Option<&str>,
        carousel_item: bool,
    ) -> Result<String> {
        let mut state = self.state.lock().unwrap();

        if let Some(message) = state.fail_create.clone() {
            return Err(remote_error(&message).into());
        }

        let id = format!("container-{}", Uuid::new_v4());
        Self::register_container(&mut state, &id);
        state.containers.push(CreatedContainer {
            id: id.clone(),
            image_url: image_url.to_string(),
            caption: caption.map(str::to_string),
            carousel_item,
        });

        Ok(id)
    }

    async fn create_carousel_container(
        &self,
        _account_id: &str,
        children: &[String],
        caption: &str,
    ) -> Result<String> {
        let mut state = self.state.lock().unwrap();

        if let Some(message) = state.fail_carousel.clone() {
            return Err(remote_error(&message).into());
        }

        let id = format!("container-{}", Uuid::new_v4());
        Self::register_container(&mut state, &id);
        state.carousels.push(CreatedCarousel {
            id: id.clone(),
            children: children.to_vec(),
            caption: caption.to_string(),
        });

        Ok(id)
    }

    async fn publish(&self, _account_id: &str, container_id: &str) -> Result<String> {
        let mut state = self.state.lock().unwrap();

        if let Some(message) = state.fail_publish.clone() {
            return Err(remote_error(&message).into());
        }

        state.published.push(container_id.to_string());
        Ok(format!("media-{}", Uuid::new_v4()))
    }

    async fn container_status(&self, container_id: &str) -> Result<ContainerStatus> {
        let mut state = self.state.lock().unwrap();
        state.status_polls += 1;

        let queue = state
            .statuses
            .get_mut(container_id)
            .ok_or_else(|| remote_error(&format!("unknown container: {}", container_id)))?;

        // Keep repeating the last scripted status once the queue drains
        let status = if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap_or_else(ContainerStatus::finished)
        };

        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::StatusCode;

    #[tokio::test]
    async fn test_default_container_finishes_first_poll() {
        let mock = MockApi::new();
        let id = mock
            .create_container("acct", "https://cdn.example.com/a.jpg", Some("hi"), false)
            .await
            .unwrap();

        let status = mock.container_status(&id).await.unwrap();
        assert_eq!(status.code, StatusCode::Finished);
    }

    #[tokio::test]
    async fn test_status_script_plays_in_order_and_repeats_last() {
        let mock = MockApi::new();
        mock.push_status_script(vec![
            ContainerStatus::in_progress(),
            ContainerStatus::error("bad media"),
        ]);

        let id = mock
            .create_container("acct", "https://cdn.example.com/a.jpg", None, true)
            .await
            .unwrap();

        assert_eq!(
            mock.container_status(&id).await.unwrap().code,
            StatusCode::InProgress
        );
        assert_eq!(
            mock.container_status(&id).await.unwrap().code,
            StatusCode::Error
        );
        // Last status repeats
        assert_eq!(
            mock.container_status(&id).await.unwrap().code,
            StatusCode::Error
        );
    }

    #[tokio::test]
    async fn test_failing_create() {
        let mock = MockApi::failing_create("quota exceeded");
        let result = mock
            .create_container("acct", "https://cdn.example.com/a.jpg", None, false)
            .await;

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("quota exceeded"));
        assert!(mock.created_containers().is_empty());
    }

    #[tokio::test]
    async fn test_calls_are_recorded() {
        let mock = MockApi::new();

        let a = mock
            .create_container("acct", "https://cdn.example.com/a.jpg", None, true)
            .await
            .unwrap();
        let b = mock
            .create_container("acct", "https://cdn.example.com/b.jpg", None, true)
            .await
            .unwrap();
        let parent = mock
            .create_carousel_container("acct", &[a.clone(), b.clone()], "caption")
            .await
            .unwrap();
        mock.publish("acct", &parent).await.unwrap();

        assert_eq!(mock.created_containers().len(), 2);
        assert!(mock.created_containers().iter().all(|c| c.carousel_item));

        let carousels = mock.created_carousels();
        assert_eq!(carousels.len(), 1);
        assert_eq!(carousels[0].children, vec![a, b]);

        assert_eq!(mock.published(), vec![parent]);
    }

    #[tokio::test]
    async fn test_unknown_container_status_is_error() {
        let mock = MockApi::new();
        assert!(mock.container_status("container-missing").await.is_err());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let mock = MockApi::new();
        let observer = mock.clone();

        mock.create_container("acct", "https://cdn.example.com/a.jpg", None, false)
            .await
            .unwrap();

        assert_eq!(observer.created_containers().len(), 1);
    }
}
