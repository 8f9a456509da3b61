//! Router and the single follower-count route.
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;
use flock_scraper::twitter::extract;
use flock_scraper::{FollowerSource, ScrapeError};

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn FollowerSource>,
}

/// Build the app router over an injected follower source.
pub fn router(source: Arc<dyn FollowerSource>) -> Router {
    Router::new()
        .route("/{twitter_id}", get(get_followers))
        .with_state(AppState { source })
}

/// `GET /{twitter_id}` → `200 <count>`, or `200 0` on any failure. The
/// masking keeps a failed lookup indistinguishable from a zero-follower
/// account; the distinction lives in the logs.
async fn get_followers(
    State(state): State<AppState>,
    Path(twitter_id): Path<String>,
) -> String {
    match lookup_followers(state.source.as_ref(), &twitter_id).await {
        Ok(count) => count.to_string(),
        Err(err) => {
            tracing::warn!(%twitter_id, error = %err, "follower lookup failed, returning zero");
            "0".to_string()
        }
    }
}

/// One lookup with a single-element id collection, first element, fixed key
/// path. The identifier goes through unvalidated, empty strings included.
pub async fn lookup_followers(
    source: &dyn FollowerSource,
    twitter_id: &str,
) -> Result<u64, ScrapeError> {
    let users = source.users_by_rest_ids(&[twitter_id.to_string()]).await?;
    let user = users
        .into_iter()
        .next()
        .ok_or_else(|| ScrapeError::UserNotFound(twitter_id.to_string()))?;

    tracing::debug!(%twitter_id, response = ?user, "user lookup succeeded");

    extract::followers_count(&user)
        .ok_or(ScrapeError::MissingField("data.user.result.legacy.followers_count"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use flock_scraper::twitter::types::UserResponse;
    use std::sync::Mutex;

    /// Records the ids it is asked about and returns an empty collection.
    struct RecordingSource {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl FollowerSource for RecordingSource {
        async fn users_by_rest_ids(
            &self,
            ids: &[String],
        ) -> Result<Vec<UserResponse>, ScrapeError> {
            self.seen.lock().unwrap().extend(ids.iter().cloned());
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn empty_identifier_still_reaches_the_source() {
        let source = RecordingSource {
            seen: Mutex::new(vec![]),
        };

        let result = lookup_followers(&source, "").await;
        assert!(matches!(result, Err(ScrapeError::UserNotFound(_))));
        assert_eq!(*source.seen.lock().unwrap(), vec![String::new()]);
    }
}
