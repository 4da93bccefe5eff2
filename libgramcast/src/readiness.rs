//! Container readiness polling
//!
//! An uploaded container is not immediately publishable; the remote side
//! processes media asynchronously. This module polls the status endpoint
//! at a fixed interval until the container reaches a terminal state or
//! the attempt budget runs out.

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::api::{PublishApi, StatusCode};
use crate::config::PollSettings;

/// Why a container never became publishable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadinessFailure {
    /// The remote reported a terminal ERROR status. Further polling is
    /// pointless; the detail is whatever the remote supplied.
    #[error("container reported terminal error: {0}")]
    Remote(String),

    /// The attempt budget ran out without a terminal state.
    #[error("container not ready after {attempts} attempts")]
    TimedOut { attempts: u32 },
}

/// Poll until the container is publishable.
///
/// Each attempt inspects the status code: `FINISHED` succeeds
/// immediately, `ERROR` fails immediately, anything else (including a
/// transient poll failure, which is logged) consumes an attempt and waits
/// out the interval.
pub async fn await_ready(
    api: &dyn PublishApi,
    container_id: &str,
    settings: &PollSettings,
) -> Result<(), ReadinessFailure> {
    for attempt in 1..=settings.max_attempts {
        match api.container_status(container_id).await {
            Ok(status) => match status.code {
                StatusCode::Finished => {
                    debug!(container = container_id, attempt, "container ready");
                    return Ok(());
                }
                StatusCode::Error => {
                    let detail = status
                        .detail
                        .unwrap_or_else(|| "no detail provided".to_string());
                    return Err(ReadinessFailure::Remote(detail));
                }
                code => {
                    debug!(
                        container = container_id,
                        attempt,
                        max_attempts = settings.max_attempts,
                        status = %code,
                        "container still processing"
                    );
                }
            },
            Err(e) => {
                warn!(
                    container = container_id,
                    attempt,
                    error = %e,
                    "status poll failed, retrying"
                );
            }
        }

        if attempt < settings.max_attempts {
            sleep(settings.interval).await;
        }
    }

    Err(ReadinessFailure::TimedOut {
        attempts: settings.max_attempts,
    })
}
