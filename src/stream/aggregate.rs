//! Stream aggregation
//!
//! Fans out to the configured upstream addons, normalizes every result
//! through extraction + rendering, dedupes by content hash, sorts, then
//! partitions by cache status and builds the playable links the client
//! sees.

use anyhow::{anyhow, Result};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::api::AddonClient;
use crate::cache::TtlCache;
use crate::extract::result::ExtractedStore;
use crate::extract::{Extraction, Extractor};
use crate::models::{normalize_hash, Manifest, MediaId, ResourceName, Stream};
use crate::rank::{sort_streams, SortSpec};
use crate::render::StreamTemplate;
use crate::store::{check_magnets, StoreBinding, StoreName};
use crate::stream::ProxyLinkIssuer;

const MANIFEST_TTL: Duration = Duration::from_secs(30 * 60);

/// One configured upstream addon
#[derive(Clone)]
pub struct Upstream {
    pub name: String,
    pub url: String,
    pub extractor: Arc<Extractor>,
    /// Re-address results by recovered hash instead of the addon's own URL
    pub reconfigure_store: bool,
    /// Never wrap this addon's direct URLs in proxy links
    pub no_content_proxy: bool,
}

/// A raw stream plus its canonical extraction
#[derive(Clone)]
pub struct WrappedStream {
    pub stream: Stream,
    pub extraction: Option<Extraction>,
    pub no_content_proxy: bool,
}

impl WrappedStream {
    /// Content hash for dedup / cache checks, when hash-addressed
    fn check_hash(&self) -> Option<String> {
        if !self.stream.url.is_empty() || self.stream.info_hash.is_empty() {
            return None;
        }
        normalize_hash(&self.stream.info_hash)
    }
}

/// Options for building the final response
pub struct StreamsOptions<'a> {
    /// Gateway base URL deferred resolution links hang off
    pub base_url: &'a str,
    /// Drop results no backend has cached
    pub cached_only: bool,
    pub client_ip: Option<&'a str>,
    /// Whether the caller may receive proxied links
    pub proxy_authorized: bool,
}

/// Fan-out, normalize, dedupe, sort
pub struct Aggregator {
    client: AddonClient,
    template: Option<StreamTemplate>,
    sort: Vec<SortSpec>,
    manifests: TtlCache<Manifest>,
}

impl Aggregator {
    pub fn new(client: AddonClient, template: Option<StreamTemplate>, sort: Vec<SortSpec>) -> Self {
        Aggregator {
            client,
            template,
            sort,
            manifests: TtlCache::new("addon-manifest", MANIFEST_TTL),
        }
    }

    /// Fetch and normalize streams for a media id across all upstreams.
    ///
    /// A single addon failing is logged and dropped; the aggregation only
    /// fails when no addon delivered.
    pub async fn fetch_streams(
        &self,
        upstreams: &[Upstream],
        media: &MediaId,
    ) -> Result<Vec<WrappedStream>> {
        if upstreams.is_empty() {
            return Err(anyhow!("no upstream addons configured"));
        }

        let selected = self.select_upstreams(upstreams, media).await;
        if selected.is_empty() {
            debug!(media = %media, "no upstream addon serves this id");
            return Ok(Vec::new());
        }

        let category = media.media_type().to_string();
        let id = media.to_string();

        let fetches = selected.iter().map(|up| {
            let client = &self.client;
            let (category, id) = (category.clone(), id.clone());
            async move { client.streams(&up.url, &category, &id).await }
        });
        let responses = join_all(fetches).await;

        let mut all = Vec::new();
        let mut errors = Vec::new();
        for (up, response) in selected.iter().zip(responses) {
            match response {
                Ok(data) => {
                    debug!(addon = %up.name, count = data.streams.len(), "fetched streams");
                    for stream in data.streams {
                        all.push(self.transform(up, stream, &category));
                    }
                }
                Err(err) => {
                    warn!(addon = %up.name, error = %err, "failed to fetch streams");
                    errors.push(format!("{}: {}", up.name, err));
                }
            }
        }

        if all.is_empty() && errors.len() == selected.len() && !errors.is_empty() {
            return Err(anyhow!("all upstream addons failed: {}", errors.join("; ")));
        }

        let total = all.len();
        let mut all = dedupe_streams(all);
        debug!(total, deduped = all.len(), "collected streams");

        sort_streams(&mut all, &self.sort, |w| w.extraction.as_ref());

        Ok(all)
    }

    /// Keep the upstreams whose manifest capabilities cover this request.
    /// A single configured upstream skips the manifest round-trip.
    async fn select_upstreams<'a>(
        &self,
        upstreams: &'a [Upstream],
        media: &MediaId,
    ) -> Vec<&'a Upstream> {
        if upstreams.len() == 1 {
            return upstreams.iter().collect();
        }

        let content_type = media.media_type().to_string();
        let id = media.to_string();

        let lookups = upstreams.iter().map(|up| async move {
            if let Some(manifest) = self.manifests.get(&up.url) {
                return Some(manifest);
            }
            match self.client.manifest(&up.url).await {
                Ok(manifest) => {
                    self.manifests.put(up.url.clone(), manifest.clone());
                    Some(manifest)
                }
                Err(err) => {
                    warn!(addon = %up.name, error = %err, "failed to fetch manifest");
                    None
                }
            }
        });

        let manifests = join_all(lookups).await;
        upstreams
            .iter()
            .zip(manifests)
            .filter_map(|(up, manifest)| {
                let manifest = manifest?;
                manifest
                    .supports(ResourceName::Stream, &content_type, &id)
                    .then_some(up)
            })
            .collect()
    }

    fn transform(&self, up: &Upstream, stream: Stream, category: &str) -> WrappedStream {
        let mut stream = stream;
        let mut extraction = up.extractor.extract(&stream, category);

        // the addon handed out its own URL but the text recovered a hash:
        // address by hash instead, and drop the addon-asserted store state
        if up.reconfigure_store && !stream.url.is_empty() && !extraction.hash.is_empty() {
            stream.info_hash = extraction.hash.clone();
            stream.file_idx = Some(extraction.file.idx);
            stream.url.clear();
            extraction.store = ExtractedStore::default();
            if !extraction.file.name.is_empty() {
                let hints = stream.behavior_hints.get_or_insert_with(Default::default);
                if hints.filename.is_none() {
                    hints.filename = Some(extraction.file.name.clone());
                }
            }
        }

        if let Some(template) = &self.template {
            template.render(&mut stream, &extraction);
        }

        WrappedStream {
            stream,
            extraction: Some(extraction),
            no_content_proxy: up.no_content_proxy,
        }
    }
}

/// Drop hash duplicates; first occurrence (addon order, then result
/// order) wins. URL-only streams never dedupe against each other.
pub fn dedupe_streams(streams: Vec<WrappedStream>) -> Vec<WrappedStream> {
    let mut seen = std::collections::HashSet::new();
    streams
        .into_iter()
        .filter(|s| {
            let hash = s
                .extraction
                .as_ref()
                .map(|e| e.hash.as_str())
                .unwrap_or_default();
            if hash.is_empty() {
                return true;
            }
            seen.insert(hash.to_string())
        })
        .collect()
}

/// Partition normalized streams into instantly-playable and deferred,
/// and attach the links the client will follow.
pub async fn build_playable_streams(
    wrapped: Vec<WrappedStream>,
    bindings: &[StoreBinding],
    issuer: &dyn ProxyLinkIssuer,
    media: &MediaId,
    opts: &StreamsOptions<'_>,
) -> Result<Vec<Stream>> {
    let hashes: Vec<String> = wrapped.iter().filter_map(|w| w.check_hash()).collect();

    let cached_by_hash = if hashes.is_empty() {
        Default::default()
    } else {
        if bindings.is_empty() {
            return Err(anyhow!("no store bindings configured"));
        }
        let sid = media.to_string();
        check_magnets(bindings, &hashes, opts.client_ip, Some(&sid))
            .await?
            .by_hash
    };

    let mut cached = Vec::new();
    let mut uncached = Vec::new();

    for wrapped_stream in wrapped {
        let no_content_proxy = wrapped_stream.no_content_proxy;
        let extraction = wrapped_stream.extraction;
        let mut stream = wrapped_stream.stream;

        if stream.url.is_empty() && !stream.info_hash.is_empty() {
            let Some(hash) = normalize_hash(&stream.info_hash) else {
                continue;
            };
            let file_idx = stream.file_idx.unwrap_or(0);
            let base = deferred_link_base(opts.base_url, &hash, file_idx, &stream);
            let mut query = format!("sid={}", urlencoding::encode(&media.to_string()));
            if let Some(extraction) = &extraction {
                if extraction.season != -1 && extraction.episode != -1 {
                    let pattern = format!("{}.{{1,3}}{}", extraction.season, extraction.episode);
                    query.push_str("&re=");
                    query.push_str(&urlencoding::encode(&pattern));
                }
            }
            stream.info_hash.clear();
            stream.file_idx = None;

            if let Some(code) = cached_by_hash.get(&hash) {
                stream.url = format!("{}?{}&s={}", base, query, code);
                stream.name = format!("⚡ [{}] {}", code, stream.name);
                cached.push(stream);
            } else if !opts.cached_only {
                for binding in bindings {
                    // EasyDebrid cannot add uncached magnets
                    if binding.store.name() == StoreName::EasyDebrid {
                        continue;
                    }
                    let code = binding.code();
                    let mut stream = stream.clone();
                    stream.url = format!("{}?{}&s={}", base, query, code);
                    stream.name = format!("[{}] {}", code, stream.name);
                    uncached.push(stream);
                }
            }
        } else if !stream.url.is_empty() {
            if !no_content_proxy && opts.proxy_authorized {
                let headers = stream
                    .behavior_hints
                    .as_ref()
                    .and_then(|h| h.proxy_headers.as_ref())
                    .and_then(|h| h.request.as_ref());
                match issuer.issue(&stream.url, headers).await {
                    Ok(url) if url != stream.url => {
                        stream.url = url;
                        stream.name = format!("✨ {}", stream.name);
                    }
                    Ok(_) => {}
                    Err(err) => {
                        warn!(error = %err, "failed to issue proxy link, using raw url");
                    }
                }
            }
            let is_cached = extraction
                .as_ref()
                .map(|e| e.store.is_cached)
                .unwrap_or(true);
            if is_cached {
                cached.push(stream);
            } else {
                uncached.push(stream);
            }
        }
    }

    cached.extend(uncached);
    Ok(cached)
}

fn deferred_link_base(base_url: &str, hash: &str, file_idx: i64, stream: &Stream) -> String {
    let mut base = format!(
        "{}/strem/{}/{}",
        base_url.trim_end_matches('/'),
        hash,
        file_idx
    );
    if let Some(filename) = stream
        .behavior_hints
        .as_ref()
        .and_then(|h| h.filename.as_deref())
    {
        if !filename.is_empty() {
            base.push('/');
            base.push_str(&urlencoding::encode(filename));
        }
    }
    base
}
