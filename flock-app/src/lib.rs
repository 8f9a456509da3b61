//! Follower-count HTTP service.
//!
//! One route: `GET /{twitter_id}` returns the account's follower count as a
//! bare integer, or `0` when the lookup fails for any reason. The binary in
//! `src/bin/main.rs` wires config, logging, and the authenticated scraper.
pub mod server;
