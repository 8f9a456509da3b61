//! Trait seam between the HTTP handler and the scraper client.
use crate::twitter::types::UserResponse;
use crate::ScrapeError;
use async_trait::async_trait;

/// Lookup-by-identifier operation the route handler depends on.
///
/// Takes a collection of platform rest ids and returns one nested response
/// per id, in input order.
#[async_trait]
pub trait FollowerSource: Send + Sync {
    async fn users_by_rest_ids(&self, ids: &[String]) -> Result<Vec<UserResponse>, ScrapeError>;
}
