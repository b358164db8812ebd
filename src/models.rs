//! Data structures and types for streamgate
//!
//! Contains the shared models used across the gateway organized by domain:
//! - **Media**: parsed media identifiers (movie / series episode)
//! - **Addon protocol**: manifests, capability matching, raw streams
//! - **Sizes**: human-readable byte size parsing and formatting

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

// =============================================================================
// Media Identifiers
// =============================================================================

/// Media type discriminator derived from an id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Series,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Movie => write!(f, "movie"),
            MediaType::Series => write!(f, "series"),
        }
    }
}

/// Error for malformed media identifiers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaIdError {
    #[error("empty media id")]
    Empty,
    #[error("invalid media id: {0}")]
    Invalid(String),
}

/// Parsed media identifier: `tt1877830` or `tt0903747:1:2`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaId {
    pub imdb: String,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

impl MediaId {
    /// Parse a media id, rejecting malformed input before any network call
    pub fn parse(id: &str) -> Result<Self, MediaIdError> {
        let id = id.trim().trim_end_matches(".json");
        if id.is_empty() {
            return Err(MediaIdError::Empty);
        }

        let mut parts = id.split(':');
        let imdb = parts.next().unwrap_or_default();
        if !imdb.starts_with("tt")
            || imdb.len() < 3
            || !imdb[2..].chars().all(|c| c.is_ascii_digit())
        {
            return Err(MediaIdError::Invalid(id.to_string()));
        }

        let season = parts.next();
        let episode = parts.next();
        if parts.next().is_some() {
            return Err(MediaIdError::Invalid(id.to_string()));
        }

        match (season, episode) {
            (None, None) => Ok(MediaId {
                imdb: imdb.to_string(),
                season: None,
                episode: None,
            }),
            (Some(s), Some(e)) => {
                let season = s
                    .parse::<u32>()
                    .map_err(|_| MediaIdError::Invalid(id.to_string()))?;
                let episode = e
                    .parse::<u32>()
                    .map_err(|_| MediaIdError::Invalid(id.to_string()))?;
                Ok(MediaId {
                    imdb: imdb.to_string(),
                    season: Some(season),
                    episode: Some(episode),
                })
            }
            _ => Err(MediaIdError::Invalid(id.to_string())),
        }
    }

    pub fn media_type(&self) -> MediaType {
        if self.season.is_some() {
            MediaType::Series
        } else {
            MediaType::Movie
        }
    }

    /// Pattern matching `S01E02`-style tokens in file names for this episode
    pub fn episode_pattern(&self) -> Option<String> {
        match (self.season, self.episode) {
            (Some(s), Some(e)) => Some(format!("{}.{{1,3}}{}", s, e)),
            _ => None,
        }
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.season, self.episode) {
            (Some(s), Some(e)) => write!(f, "{}:{}:{}", self.imdb, s, e),
            _ => write!(f, "{}", self.imdb),
        }
    }
}

// =============================================================================
// Addon Protocol: Manifest
// =============================================================================

/// Addon resource names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceName {
    Catalog,
    Meta,
    Stream,
    Subtitles,
    AddonCatalog,
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceName::Catalog => write!(f, "catalog"),
            ResourceName::Meta => write!(f, "meta"),
            ResourceName::Stream => write!(f, "stream"),
            ResourceName::Subtitles => write!(f, "subtitles"),
            ResourceName::AddonCatalog => write!(f, "addon_catalog"),
        }
    }
}

/// Manifest resource entry; addons declare either a bare name or an
/// object with its own types / id prefixes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManifestResource {
    Name(ResourceName),
    Full {
        name: ResourceName,
        #[serde(default)]
        types: Option<Vec<String>>,
        #[serde(rename = "idPrefixes", default)]
        id_prefixes: Option<Vec<String>>,
    },
}

impl ManifestResource {
    pub fn name(&self) -> ResourceName {
        match self {
            ManifestResource::Name(name) => *name,
            ManifestResource::Full { name, .. } => *name,
        }
    }
}

/// Addon manifest (the capability-relevant subset)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub resources: Vec<ManifestResource>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(rename = "idPrefixes", default)]
    pub id_prefixes: Option<Vec<String>>,
}

impl Manifest {
    /// Whether this addon serves `resource` for the given content type and id.
    ///
    /// A resource entry falls back to the manifest-level types / id prefixes
    /// when it does not declare its own. No declared prefixes matches any id.
    pub fn supports(&self, resource: ResourceName, content_type: &str, id: &str) -> bool {
        for r in &self.resources {
            if r.name() != resource {
                continue;
            }
            let (types, prefixes) = match r {
                ManifestResource::Name(_) => (Some(&self.types), self.id_prefixes.as_ref()),
                ManifestResource::Full {
                    types, id_prefixes, ..
                } => (
                    types.as_ref().or(Some(&self.types)),
                    id_prefixes.as_ref().or(self.id_prefixes.as_ref()),
                ),
            };
            let type_ok = types.map_or(true, |t| t.iter().any(|t| t == content_type));
            let prefix_ok =
                prefixes.map_or(true, |p| p.iter().any(|p| id.starts_with(p.as_str())));
            if type_ok && prefix_ok {
                return true;
            }
        }
        false
    }
}

// =============================================================================
// Addon Protocol: Streams
// =============================================================================

/// Proxy headers an addon asks to be used when fetching its stream URL
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyHeaders {
    #[serde(default)]
    pub request: Option<HashMap<String, String>>,
}

/// Declared hints about how to handle a stream
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorHints {
    #[serde(default)]
    pub binge_group: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub video_size: Option<u64>,
    #[serde(default)]
    pub proxy_headers: Option<ProxyHeaders>,
}

/// One stream result as returned by an upstream addon.
///
/// Either `url` or `info_hash` + `file_idx` addresses the content; the rest
/// is free-form display metadata the extraction engine normalizes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stream {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Legacy display field some addons still send instead of `description`
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "infoHash", default)]
    pub info_hash: String,
    #[serde(rename = "fileIdx", default)]
    pub file_idx: Option<i64>,
    #[serde(rename = "behaviorHints", default)]
    pub behavior_hints: Option<BehaviorHints>,
}

impl Stream {
    /// The display text to parse when `description` is empty
    pub fn description_or_title(&self) -> &str {
        if self.description.is_empty() {
            &self.title
        } else {
            &self.description
        }
    }
}

/// Stream resource response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamsResponse {
    pub streams: Vec<Stream>,
}

/// Normalize a content hash: accepts a bare 40-hex info hash or a full
/// magnet URI, returns the lowercased hash
pub fn normalize_hash(input: &str) -> Option<String> {
    let input = input.trim();
    let hash = if let Some(rest) = input.strip_prefix("magnet:") {
        rest.split('&')
            .map(|p| p.trim_start_matches('?'))
            .find_map(|p| p.strip_prefix("xt=urn:btih:"))?
            .to_string()
    } else {
        input.to_string()
    };
    let hash = hash.to_lowercase();
    if hash.len() == 40 && hash.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(hash)
    } else {
        None
    }
}

/// Build a magnet URI for a hash and display name
pub fn magnet_uri(hash: &str, display_name: &str) -> String {
    format!(
        "magnet:?xt=urn:btih:{}&dn={}",
        hash,
        urlencoding::encode(display_name)
    )
}

// =============================================================================
// Sizes
// =============================================================================

/// Parse a human-readable size string (e.g., "2.72 GB", "890MB") into bytes
pub fn parse_size_bytes(input: &str) -> Option<u64> {
    let input = input.trim();
    let split = input
        .find(|c: char| !c.is_ascii_digit() && c != '.' && c != ',')
        .unwrap_or(input.len());
    let (num, unit) = input.split_at(split);
    let num: f64 = num.replace(',', "").parse().ok()?;

    let multiplier: u64 = match unit.trim().to_ascii_uppercase().as_str() {
        "B" => 1,
        "KB" | "KIB" | "K" => 1 << 10,
        "MB" | "MIB" | "M" => 1 << 20,
        "GB" | "GIB" | "G" => 1 << 30,
        "TB" | "TIB" | "T" => 1 << 40,
        _ => return None,
    };
    Some((num * multiplier as f64) as u64)
}

/// Format bytes for display (binary units, labelled the way release titles do)
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // MediaId Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_media_id_movie() {
        let id = MediaId::parse("tt1877830").unwrap();
        assert_eq!(id.imdb, "tt1877830");
        assert_eq!(id.media_type(), MediaType::Movie);
        assert_eq!(id.episode_pattern(), None);
        assert_eq!(id.to_string(), "tt1877830");
    }

    #[test]
    fn test_media_id_episode() {
        let id = MediaId::parse("tt0903747:1:2").unwrap();
        assert_eq!(id.season, Some(1));
        assert_eq!(id.episode, Some(2));
        assert_eq!(id.media_type(), MediaType::Series);
        assert_eq!(id.episode_pattern().unwrap(), "1.{1,3}2");
        assert_eq!(id.to_string(), "tt0903747:1:2");
    }

    #[test]
    fn test_media_id_strips_json_suffix() {
        let id = MediaId::parse("tt1877830.json").unwrap();
        assert_eq!(id.imdb, "tt1877830");
    }

    #[test]
    fn test_media_id_rejects_malformed() {
        assert!(MediaId::parse("").is_err());
        assert!(MediaId::parse("batman").is_err());
        assert!(MediaId::parse("tt12x4").is_err());
        assert!(MediaId::parse("tt123:1").is_err());
        assert!(MediaId::parse("tt123:a:b").is_err());
        assert!(MediaId::parse("tt123:1:2:3").is_err());
    }

    // -------------------------------------------------------------------------
    // Manifest Tests
    // -------------------------------------------------------------------------

    fn manifest(json: &str) -> Manifest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_manifest_bare_resource_uses_manifest_level_capabilities() {
        let m = manifest(
            r#"{
                "id": "org.example",
                "name": "Example",
                "resources": ["stream"],
                "types": ["movie"],
                "idPrefixes": ["tt"]
            }"#,
        );
        assert!(m.supports(ResourceName::Stream, "movie", "tt123"));
        assert!(!m.supports(ResourceName::Stream, "series", "tt123"));
        assert!(!m.supports(ResourceName::Stream, "movie", "kitsu:1"));
        assert!(!m.supports(ResourceName::Meta, "movie", "tt123"));
    }

    #[test]
    fn test_manifest_full_resource_overrides_capabilities() {
        let m = manifest(
            r#"{
                "id": "org.example",
                "name": "Example",
                "resources": [
                    {"name": "stream", "types": ["series"], "idPrefixes": ["kitsu"]}
                ],
                "types": ["movie"],
                "idPrefixes": ["tt"]
            }"#,
        );
        assert!(m.supports(ResourceName::Stream, "series", "kitsu:1:1"));
        assert!(!m.supports(ResourceName::Stream, "movie", "tt123"));
    }

    #[test]
    fn test_manifest_no_prefixes_matches_any_id() {
        let m = manifest(
            r#"{
                "id": "org.example",
                "name": "Example",
                "resources": ["stream"],
                "types": ["movie"]
            }"#,
        );
        assert!(m.supports(ResourceName::Stream, "movie", "anything"));
    }

    // -------------------------------------------------------------------------
    // Stream Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_stream_deserializes_wire_names() {
        let s: Stream = serde_json::from_str(
            r#"{
                "name": "Torrentio\n4k",
                "title": "Some.Movie.2160p",
                "infoHash": "e4f5d7a2f3dd6b7b1826bd77e316b6b5ba31eb72",
                "fileIdx": 3,
                "behaviorHints": {"bingeGroup": "torrentio|4k", "filename": "a.mkv", "videoSize": 1024}
            }"#,
        )
        .unwrap();
        assert_eq!(s.info_hash, "e4f5d7a2f3dd6b7b1826bd77e316b6b5ba31eb72");
        assert_eq!(s.file_idx, Some(3));
        let hints = s.behavior_hints.unwrap();
        assert_eq!(hints.binge_group.as_deref(), Some("torrentio|4k"));
        assert_eq!(hints.video_size, Some(1024));
    }

    #[test]
    fn test_description_falls_back_to_title() {
        let s = Stream {
            title: "legacy".to_string(),
            ..Stream::default()
        };
        assert_eq!(s.description_or_title(), "legacy");
    }

    // -------------------------------------------------------------------------
    // Hash Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_normalize_hash_bare() {
        assert_eq!(
            normalize_hash("E4F5D7A2F3DD6B7B1826BD77E316B6B5BA31EB72").unwrap(),
            "e4f5d7a2f3dd6b7b1826bd77e316b6b5ba31eb72"
        );
    }

    #[test]
    fn test_normalize_hash_magnet_uri() {
        let magnet =
            "magnet:?xt=urn:btih:e4f5d7a2f3dd6b7b1826bd77e316b6b5ba31eb72&dn=Some%20Movie";
        assert_eq!(
            normalize_hash(magnet).unwrap(),
            "e4f5d7a2f3dd6b7b1826bd77e316b6b5ba31eb72"
        );
    }

    #[test]
    fn test_normalize_hash_rejects_garbage() {
        assert!(normalize_hash("nothash").is_none());
        assert!(normalize_hash("magnet:?dn=NoHashHere").is_none());
    }

    #[test]
    fn test_magnet_uri_encodes_name() {
        let uri = magnet_uri("abc123", "Tom & Jerry");
        assert_eq!(uri, "magnet:?xt=urn:btih:abc123&dn=Tom%20%26%20Jerry");
    }

    // -------------------------------------------------------------------------
    // Size Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_size_gb() {
        let bytes = parse_size_bytes("2.72 GB").unwrap();
        assert!(bytes > 2_900_000_000 && bytes < 2_930_000_000);
    }

    #[test]
    fn test_parse_size_mb_no_space() {
        let bytes = parse_size_bytes("890MB").unwrap();
        assert_eq!(bytes, (890.0 * 1024.0 * 1024.0) as u64);
    }

    #[test]
    fn test_parse_size_unparseable() {
        assert!(parse_size_bytes("N/A").is_none());
        assert!(parse_size_bytes("12 parsecs").is_none());
        assert!(parse_size_bytes("").is_none());
    }

    #[test]
    fn test_size_ordering_matches_magnitude() {
        let small = parse_size_bytes("2.72 GB").unwrap();
        let large = parse_size_bytes("40.33 GB").unwrap();
        assert!(small < large);
    }

    #[test]
    fn test_format_size_round_trip_label() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1024 * 1024), "1.00 MB");
        assert_eq!(
            format_size((4.2 * 1024.0 * 1024.0 * 1024.0) as u64),
            "4.20 GB"
        );
    }
}
