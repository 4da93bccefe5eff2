//! End-to-end batch runs over a temp store and the mock API

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use tempfile::TempDir;

use libgramcast::api::{ContainerStatus, MockApi};
use libgramcast::config::PollSettings;
use libgramcast::error::{GramcastError, StoreError};
use libgramcast::{
    BatchRunner, Post, PostCollection, PostStore, Publisher, PublishState,
};

fn batch_now() -> DateTime<Utc> {
    "2026-04-01T12:00:00Z".parse().unwrap()
}

fn fast_poll() -> PollSettings {
    PollSettings {
        interval: Duration::from_millis(1),
        max_attempts: 5,
    }
}

fn post(name: &str, date: (i32, u32, u32), images: &[&str]) -> Post {
    Post {
        name: name.to_string(),
        publish_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        publish_time: None,
        caption: format!("Caption for {}", name),
        hashtags: vec!["daily".to_string()],
        images: images.iter().map(|s| s.to_string()).collect(),
        status: PublishState::default(),
    }
}

fn runner_over(mock: &MockApi, path: PathBuf) -> BatchRunner {
    let publisher = Publisher::new(Box::new(mock.clone()), "acct-1", fast_poll());
    BatchRunner::new(PostStore::new(path), publisher, chrono_tz::UTC)
}

#[tokio::test]
async fn test_missing_store_aborts_before_processing() {
    let dir = TempDir::new().unwrap();
    let mock = MockApi::new();
    let runner = runner_over(&mock, dir.path().join("absent.json"));

    let result = runner.run_at(batch_now()).await;

    assert!(matches!(
        result,
        Err(GramcastError::Store(StoreError::NotFound(_)))
    ));
    assert_eq!(mock.total_calls(), 0);
}

#[tokio::test]
async fn test_due_single_image_post_is_published_and_persisted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("posts.json");
    let store = PostStore::new(path.clone());
    store
        .save(&PostCollection {
            posts: vec![post("a", (2026, 4, 1), &["https://cdn.example.com/a.jpg"])],
        })
        .unwrap();

    let mock = MockApi::new();
    let runner = runner_over(&mock, path.clone());

    let summary = runner.run_at(batch_now()).await.unwrap();
    assert_eq!(summary.published, 1);
    assert_eq!(summary.failed, 0);

    let persisted = PostStore::new(path).load().unwrap();
    assert!(persisted.posts[0].status.posted);
    assert_eq!(persisted.posts[0].status.posted_at, Some(batch_now()));

    assert_eq!(mock.created_containers().len(), 1);
    assert_eq!(mock.published().len(), 1);
}

#[tokio::test]
async fn test_carousel_child_error_leaves_state_and_batch_continues() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("posts.json");
    let store = PostStore::new(path.clone());
    store
        .save(&PostCollection {
            posts: vec![
                post(
                    "broken-carousel",
                    (2026, 4, 1),
                    &[
                        "https://cdn.example.com/a.jpg",
                        "https://cdn.example.com/b.jpg",
                        "https://cdn.example.com/c.jpg",
                    ],
                ),
                post("after", (2026, 4, 1), &["https://cdn.example.com/d.jpg"]),
            ],
        })
        .unwrap();

    let mock = MockApi::new();
    // Second child of the carousel reports a terminal error on its
    // second poll
    mock.push_status_script(vec![ContainerStatus::finished()]);
    mock.push_status_script(vec![
        ContainerStatus::in_progress(),
        ContainerStatus::error("child rejected"),
    ]);
    mock.push_status_script(vec![ContainerStatus::finished()]);

    let runner = runner_over(&mock, path.clone());
    let summary = runner.run_at(batch_now()).await.unwrap();

    assert_eq!(summary.published, 1);
    assert_eq!(summary.failed, 1);

    // No parent container was created for the failed carousel
    assert!(mock.created_carousels().is_empty());

    let persisted = PostStore::new(path).load().unwrap();
    assert!(!persisted.posts[0].status.posted);
    assert_eq!(persisted.posts[0].status.posted_at, None);
    assert!(persisted.posts[1].status.posted);
}

#[tokio::test]
async fn test_future_post_triggers_no_remote_calls_and_no_write() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("posts.json");
    // Hand-written compact document: any save would reformat it, so
    // unchanged bytes prove no write happened
    let raw = r#"{"posts":[{"name":"tomorrow","publish_date":"2026-04-02","caption":"x","images":["https://cdn.example.com/a.jpg"]}]}"#;
    std::fs::write(&path, raw).unwrap();

    let mock = MockApi::new();
    let runner = runner_over(&mock, path.clone());

    let summary = runner.run_at(batch_now()).await.unwrap();

    assert_eq!(summary, Default::default());
    assert_eq!(mock.total_calls(), 0);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), raw);
}

#[tokio::test]
async fn test_already_posted_post_is_never_republished() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("posts.json");
    let raw = r#"{"posts":[{"name":"done","publish_date":"2026-03-01","caption":"x","images":["https://cdn.example.com/a.jpg"],"status":{"posted":true,"posted_at":"2026-03-01T00:01:00Z"}}]}"#;
    std::fs::write(&path, raw).unwrap();

    let mock = MockApi::new();
    let runner = runner_over(&mock, path.clone());

    let summary = runner.run_at(batch_now()).await.unwrap();

    assert_eq!(summary.published, 0);
    assert_eq!(mock.total_calls(), 0);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), raw);
}

#[tokio::test]
async fn test_post_without_media_is_skipped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("posts.json");
    let raw = r#"{"posts":[{"name":"no-media","publish_date":"2026-04-01","caption":"x"}]}"#;
    std::fs::write(&path, raw).unwrap();

    let mock = MockApi::new();
    let runner = runner_over(&mock, path.clone());

    let summary = runner.run_at(batch_now()).await.unwrap();

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.published, 0);
    assert_eq!(mock.total_calls(), 0);
    // Nothing changed, nothing written
    assert_eq!(std::fs::read_to_string(&path).unwrap(), raw);
}

#[tokio::test]
async fn test_failed_post_leaves_store_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("posts.json");
    let raw = r#"{"posts":[{"name":"flaky","publish_date":"2026-04-01","caption":"x","images":["https://cdn.example.com/a.jpg"]}]}"#;
    std::fs::write(&path, raw).unwrap();

    let mock = MockApi::failing_create("quota exceeded");
    let runner = runner_over(&mock, path.clone());

    let summary = runner.run_at(batch_now()).await.unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), raw);
}

#[tokio::test]
async fn test_back_to_back_runs_are_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("posts.json");
    let store = PostStore::new(path.clone());
    store
        .save(&PostCollection {
            posts: vec![post("once", (2026, 4, 1), &["https://cdn.example.com/a.jpg"])],
        })
        .unwrap();

    let mock = MockApi::new();
    let runner = runner_over(&mock, path.clone());

    let first = runner.run_at(batch_now()).await.unwrap();
    assert_eq!(first.published, 1);
    let after_first = std::fs::read_to_string(&path).unwrap();
    let calls_after_first = mock.total_calls();

    // Second run: nothing newly due, no remote calls, identical output
    let second = runner.run_at(batch_now()).await.unwrap();
    assert_eq!(second.published, 0);
    assert_eq!(mock.total_calls(), calls_after_first);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), after_first);
}

#[tokio::test]
async fn test_posts_are_processed_in_collection_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("posts.json");
    let store = PostStore::new(path.clone());
    store
        .save(&PostCollection {
            posts: vec![
                post("first", (2026, 4, 1), &["https://cdn.example.com/1.jpg"]),
                post("second", (2026, 4, 1), &["https://cdn.example.com/2.jpg"]),
            ],
        })
        .unwrap();

    let mock = MockApi::new();
    let runner = runner_over(&mock, path);
    runner.run_at(batch_now()).await.unwrap();

    let urls: Vec<String> = mock
        .created_containers()
        .into_iter()
        .map(|c| c.image_url)
        .collect();
    assert_eq!(
        urls,
        vec![
            "https://cdn.example.com/1.jpg".to_string(),
            "https://cdn.example.com/2.jpg".to_string(),
        ]
    );
}
