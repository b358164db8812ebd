//! Resolution engine
//!
//! Turns one chosen result (backend + content hash + file selector) into
//! a final playable URL: add the magnet, poll until downloaded, pick the
//! target file, generate a link. Concurrent identical requests coalesce
//! into one backend call; outcomes are cached so repeats stay cheap. The
//! caller always gets a URL to redirect to, never a raw error.

use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

use crate::cache::TtlCache;
use crate::models::MediaId;
use crate::store::{
    AddMagnetParams, GenerateLinkParams, GetMagnetData, GetMagnetParams, MagnetFile, MagnetStatus,
    StoreBinding,
};
use crate::stream::coalesce::SingleFlight;
use crate::stream::ProxyLinkIssuer;

const POLL_ATTEMPTS: u32 = 3;
const POLL_INTERVAL: Duration = Duration::from_secs(5);
const LINK_TTL: Duration = Duration::from_secs(3 * 60 * 60);
const FAILURE_TTL: Duration = Duration::from_secs(60);

const VIDEO_EXTENSIONS: [&str; 16] = [
    ".3g2", ".3gp", ".avi", ".flv", ".m2ts", ".m4v", ".mkv", ".mov", ".mp4", ".mpg", ".mpeg",
    ".ogv", ".ts", ".webm", ".wmv", ".divx",
];

fn has_video_extension(name: &str) -> bool {
    let name = name.to_lowercase();
    VIDEO_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Terminal failure classes; each maps to an informational video
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Downloading,
    DownloadFailed,
    NoMatchingFile,
    Internal,
}

impl FailureClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureClass::Downloading => "downloading",
            FailureClass::DownloadFailed => "download_failed",
            FailureClass::NoMatchingFile => "no_matching_file",
            FailureClass::Internal => "internal_error",
        }
    }
}

/// What the caller redirects to
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackResult {
    /// A working stream link
    Link(String),
    /// Informational video standing in for a terminal failure
    Fallback { class: FailureClass, url: String },
}

impl PlaybackResult {
    pub fn url(&self) -> &str {
        match self {
            PlaybackResult::Link(url) => url,
            PlaybackResult::Fallback { url, .. } => url,
        }
    }
}

/// One resolution request
#[derive(Clone)]
pub struct ResolveRequest {
    pub binding: StoreBinding,
    pub hash: String,
    /// -1 when the addon did not address a specific file
    pub file_idx: i64,
    pub file_name: String,
    pub media_id: Option<MediaId>,
    /// Caller-supplied file-name pattern
    pub pattern: Option<String>,
    pub client_ip: Option<String>,
}

impl ResolveRequest {
    /// Composite identity: response-cache key and coalescing key
    pub fn playback_key(&self) -> String {
        let extra = format!(
            "{}|{}",
            self.media_id.as_ref().map(|m| m.to_string()).unwrap_or_default(),
            self.pattern.as_deref().unwrap_or_default(),
        );
        let code = self.binding.code();
        let idx = self.file_idx.to_string();
        [
            self.client_ip.as_deref().unwrap_or_default(),
            code.as_str(),
            self.binding.token.as_str(),
            self.hash.as_str(),
            idx.as_str(),
            self.file_name.as_str(),
            extra.as_str(),
        ]
        .join(":")
    }
}

#[derive(Clone)]
struct ResolveOutcome {
    link: Option<String>,
    failure: Option<FailureClass>,
    log: String,
}

impl ResolveOutcome {
    fn link(link: String) -> Self {
        ResolveOutcome {
            link: Some(link),
            failure: None,
            log: String::new(),
        }
    }

    fn failed(class: FailureClass, log: impl Into<String>) -> Self {
        ResolveOutcome {
            link: None,
            failure: Some(class),
            log: log.into(),
        }
    }
}

/// The resolution engine; construct once and share
pub struct Resolver {
    cache: Arc<TtlCache<String>>,
    flights: SingleFlight<String, ResolveOutcome>,
    issuer: Arc<dyn ProxyLinkIssuer>,
    static_video_base: String,
    poll_attempts: u32,
    poll_interval: Duration,
}

impl Resolver {
    pub fn new(issuer: Arc<dyn ProxyLinkIssuer>, static_video_base: impl Into<String>) -> Self {
        let static_video_base: String = static_video_base.into();
        Resolver {
            cache: Arc::new(TtlCache::new("stream-link", LINK_TTL)),
            flights: SingleFlight::new(),
            issuer,
            static_video_base: static_video_base.trim_end_matches('/').to_string(),
            poll_attempts: POLL_ATTEMPTS,
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Override the poll schedule (tests)
    pub fn with_poll(mut self, attempts: u32, interval: Duration) -> Self {
        self.poll_attempts = attempts;
        self.poll_interval = interval;
        self
    }

    fn static_video_url(&self, class: FailureClass) -> String {
        format!("{}/{}.mp4", self.static_video_base, class.as_str())
    }

    pub async fn resolve(&self, request: ResolveRequest) -> PlaybackResult {
        let key = request.playback_key();

        if let Some(link) = self.cache.get(&key) {
            debug!("redirecting to cached stream link");
            return PlaybackResult::Link(link);
        }

        let outcome = {
            let cache = Arc::clone(&self.cache);
            let issuer = Arc::clone(&self.issuer);
            let attempts = self.poll_attempts;
            let interval = self.poll_interval;
            let work_key = key.clone();
            self.flights
                .run(key.clone(), move || {
                    debug!("creating stream link");
                    do_resolve(cache, issuer, request, work_key, attempts, interval)
                })
                .await
                .unwrap_or_else(|| {
                    ResolveOutcome::failed(FailureClass::Internal, "resolution task died")
                })
        };

        match outcome.link {
            Some(link) => {
                debug!("redirecting to stream link");
                PlaybackResult::Link(link)
            }
            None => {
                let class = outcome.failure.unwrap_or(FailureClass::Internal);
                error!(class = class.as_str(), "{}", outcome.log);
                let url = self.static_video_url(class);
                self.cache.put_with_ttl(key.as_str(), url.clone(), FAILURE_TTL);
                PlaybackResult::Fallback { class, url }
            }
        }
    }
}

async fn do_resolve(
    cache: Arc<TtlCache<String>>,
    issuer: Arc<dyn ProxyLinkIssuer>,
    request: ResolveRequest,
    key: String,
    poll_attempts: u32,
    poll_interval: Duration,
) -> ResolveOutcome {
    let store = &request.binding.store;
    let token = &request.binding.token;

    let added = match store
        .add_magnet(&AddMagnetParams {
            api_key: token.clone(),
            magnet: request.hash.clone(),
            client_ip: request.client_ip.clone(),
        })
        .await
    {
        Ok(added) => added,
        Err(err) => {
            return ResolveOutcome::failed(
                FailureClass::DownloadFailed,
                format!("failed to add magnet: {}", err),
            );
        }
    };

    let mut magnet = GetMagnetData {
        id: added.id,
        hash: added.hash,
        name: added.name,
        status: added.status,
        files: added.files,
    };

    let mut attempt = 0;
    while magnet.status != MagnetStatus::Downloaded && attempt < poll_attempts {
        tokio::time::sleep(poll_interval).await;
        magnet = match store
            .get_magnet(&GetMagnetParams {
                api_key: token.clone(),
                id: magnet.id.clone(),
                client_ip: request.client_ip.clone(),
            })
            .await
        {
            Ok(magnet) => magnet,
            Err(err) => {
                return ResolveOutcome::failed(
                    FailureClass::Internal,
                    format!("failed to poll magnet status: {}", err),
                );
            }
        };
        attempt += 1;
    }

    if magnet.status != MagnetStatus::Downloaded {
        let class = match magnet.status {
            MagnetStatus::Queued | MagnetStatus::Downloading | MagnetStatus::Processing => {
                FailureClass::Downloading
            }
            MagnetStatus::Failed | MagnetStatus::Invalid | MagnetStatus::Unknown => {
                FailureClass::DownloadFailed
            }
            _ => FailureClass::Internal,
        };
        return ResolveOutcome::failed(
            class,
            format!("magnet stuck in status {} after polling", magnet.status),
        );
    }

    let videos: Vec<&MagnetFile> = magnet
        .files
        .iter()
        .filter(|f| has_video_extension(&f.name))
        .collect();

    let Some((file, should_tag)) = select_file(&videos, &request) else {
        return ResolveOutcome::failed(
            FailureClass::NoMatchingFile,
            format!("no matching file found for {}", magnet.hash),
        );
    };
    if file.link.is_empty() {
        return ResolveOutcome::failed(
            FailureClass::NoMatchingFile,
            format!("matched file {} has no link", file.name),
        );
    }

    if should_tag {
        if let Some(media_id) = &request.media_id {
            debug!(hash = %magnet.hash, file = %file.name, media = %media_id, "tagging file to media id");
        }
    }

    let generated = match store
        .generate_link(&GenerateLinkParams {
            api_key: token.clone(),
            link: file.link.clone(),
            client_ip: request.client_ip.clone(),
        })
        .await
    {
        Ok(generated) => generated,
        Err(err) => {
            return ResolveOutcome::failed(
                FailureClass::Internal,
                format!("failed to generate link: {}", err),
            );
        }
    };

    let link = match issuer.issue(&generated.link, None).await {
        Ok(link) => link,
        Err(err) => {
            return ResolveOutcome::failed(
                FailureClass::Internal,
                format!("failed to issue proxy link: {}", err),
            );
        }
    };

    cache.put(key, link.clone());
    ResolveOutcome::link(link)
}

/// File selection ladder: exact name, episode pattern from the media id,
/// explicit index, caller pattern, then largest video file.
///
/// Returns the chosen file and whether the media-id tagging side effect
/// may run; the largest-file fallback suppresses it unless the file is
/// provably the only candidate.
fn select_file<'a>(
    files: &[&'a MagnetFile],
    request: &ResolveRequest,
) -> Option<(&'a MagnetFile, bool)> {
    if !request.file_name.is_empty() {
        if let Some(file) = files.iter().find(|f| f.name == request.file_name) {
            debug!(file = %file.name, "matched file by name");
            return Some((file, true));
        }
    }

    if let Some(pattern) = request
        .media_id
        .as_ref()
        .and_then(|media| media.episode_pattern())
    {
        if let Ok(regex) = Regex::new(&pattern) {
            if let Some(file) = files.iter().find(|f| regex.is_match(&f.name)) {
                debug!(file = %file.name, pattern = %pattern, "matched file by episode pattern");
                return Some((file, true));
            }
        }
    }

    if request.file_idx != -1 {
        if let Some(file) = files.iter().find(|f| f.idx == request.file_idx) {
            debug!(file = %file.name, idx = request.file_idx, "matched file by index");
            return Some((file, true));
        }
    }

    if let Some(pattern) = request.pattern.as_deref() {
        if let Ok(regex) = Regex::new(pattern) {
            if let Some(file) = files.iter().find(|f| regex.is_match(&f.name)) {
                debug!(file = %file.name, pattern, "matched file by caller pattern");
                return Some((file, true));
            }
        }
    }

    let largest = files.iter().max_by_key(|f| f.size)?;
    debug!(file = %largest.name, "matched file by largest size");
    Some((largest, files.len() == 1))
}
