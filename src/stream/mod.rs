//! Stream pipeline
//!
//! - `aggregate` - fan out to upstream addons, normalize, dedupe, sort,
//!   partition by cache status and build playable links
//! - `resolve` - turn one chosen result into a final playable URL
//! - `coalesce` - one in-flight resolution per playback key

pub mod aggregate;
pub mod coalesce;
pub mod resolve;

pub use aggregate::{Aggregator, StreamsOptions, Upstream, WrappedStream};
pub use coalesce::SingleFlight;
pub use resolve::{FailureClass, PlaybackResult, ResolveRequest, Resolver};

use async_trait::async_trait;
use std::collections::HashMap;

/// Issues proxied, time-boxed links for raw backend URLs.
///
/// The passthrough implementation hands the URL back unchanged, which is
/// also the contract's behavior for unauthorized callers.
#[async_trait]
pub trait ProxyLinkIssuer: Send + Sync {
    async fn issue(
        &self,
        url: &str,
        headers: Option<&HashMap<String, String>>,
    ) -> anyhow::Result<String>;
}

/// No-op issuer: every caller gets the raw URL
pub struct PassthroughIssuer;

#[async_trait]
impl ProxyLinkIssuer for PassthroughIssuer {
    async fn issue(
        &self,
        url: &str,
        _headers: Option<&HashMap<String, String>>,
    ) -> anyhow::Result<String> {
        Ok(url.to_string())
    }
}
