//! Scraper client for follower lookups against Twitter/X.
//!
//! Submodules provide the authenticated client, JSON extraction helpers, and
//! strongly typed response models. The [`FollowerSource`] trait is the seam
//! the HTTP handler depends on, so tests can substitute a mock.
use thiserror::Error;

pub mod source;
pub mod twitter;

pub use source::FollowerSource;
pub use twitter::Scraper;

/// Failures on the lookup path. The route boundary masks all of these as the
/// zero sentinel; internally they stay distinguishable.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("login flow failed: {0}")]
    Login(String),

    #[error(transparent)]
    Http(#[from] flock_http::HttpError),

    #[error("no user record returned for id {0}")]
    UserNotFound(String),

    #[error("response missing field: {0}")]
    MissingField(&'static str),
}
