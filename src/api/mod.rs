//! API clients for external services
//!
//! - Addon: Stremio addon protocol (manifest, streams, catalog, meta, subtitles)

pub mod addon;

pub use addon::{AddonClient, AddonError};
