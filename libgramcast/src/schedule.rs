//! Due-post selection
//!
//! A post's schedule is a date plus an optional time of day, anchored to
//! the configured timezone. A post is due once that instant has arrived or
//! passed, provided it has not already been published.

use chrono::offset::LocalResult;
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::types::Post;

/// The scheduled publish instant in UTC, or `None` when the local wall
/// time does not exist in the zone (DST gap). Ambiguous local times (DST
/// fold) resolve to the earlier instant.
pub fn publish_datetime(post: &Post, tz: Tz) -> Option<DateTime<Utc>> {
    let time = post.publish_time.unwrap_or(NaiveTime::MIN);
    let naive = post.publish_date.and_time(time);

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earlier, _) => Some(earlier.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

/// Selection predicate: schedule time has arrived or passed, and the post
/// has not been published yet.
pub fn is_due(post: &Post, now: DateTime<Utc>, tz: Tz) -> bool {
    if post.status.posted {
        return false;
    }

    match publish_datetime(post, tz) {
        Some(publish_dt) => publish_dt <= now,
        None => {
            warn!(
                post = %post.name,
                date = %post.publish_date,
                zone = %tz,
                "scheduled local time does not exist in zone, skipping"
            );
            false
        }
    }
}
