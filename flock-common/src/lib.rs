//! Shared utilities for the flock workspace.
//!
//! Currently this is just the centralised tracing setup in [`observability`].
//! It is intentionally lightweight so every crate can depend on it without
//! pulling in heavy transitive costs.

pub mod observability;
