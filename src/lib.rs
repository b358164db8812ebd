//! streamgate - a gateway between media-catalog clients and debrid backends
//!
//! Fans out to upstream Stremio addons, normalizes their free-form stream
//! metadata, ranks and dedupes the results, checks which are instantly
//! playable across one or more backend accounts, and resolves a chosen
//! result into a final playable URL.
//!
//! # Modules
//!
//! - `models` - media ids, addon protocol shapes, size helpers
//! - `extract` - extraction engine (rulesets, fallback heuristics)
//! - `render` - display templates
//! - `rank` - ranking and sorting
//! - `api` - addon protocol client
//! - `store` - backend store contract, HTTP client, multi-store checks
//! - `stream` - aggregation, resolution, request coalescing
//! - `cache` - keyed TTL cache
//! - `config` - config file handling

pub mod api;
pub mod cache;
pub mod config;
pub mod extract;
pub mod models;
pub mod rank;
pub mod render;
pub mod store;
pub mod stream;

// Re-export commonly used types
pub use api::{AddonClient, AddonError};
pub use config::Config;
pub use extract::{ExtractError, Extraction, Extractor, ExtractorCache};
pub use models::{MediaId, MediaType, Stream, StreamsResponse};
pub use render::{StreamTemplate, TemplateBlob};
pub use store::{HttpStore, MagnetStatus, Store, StoreBinding, StoreName};
pub use stream::{
    Aggregator, FailureClass, PassthroughIssuer, PlaybackResult, ProxyLinkIssuer, ResolveRequest,
    Resolver, StreamsOptions, Upstream, WrappedStream,
};
