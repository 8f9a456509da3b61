//! Twitter/X integration surface.
//!
//! Submodules provide the authenticated client wrapper, JSON extraction
//! helpers, and typed response models.
pub mod client;
pub mod extract;
pub mod types;

pub use client::Scraper;
