//! Canonical extraction result
//!
//! One addon-agnostic record per raw stream. Whatever shape an upstream
//! returns, the extraction engine fills this and everything downstream
//! (rendering, ranking, dedup, cache checks) works off it.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// File coordinates inside a torrent; `idx` is -1 when unknown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFile {
    pub idx: i64,
    pub name: String,
    pub size: String,
}

impl Default for ExtractedFile {
    fn default() -> Self {
        ExtractedFile {
            idx: -1,
            name: String::new(),
            size: String::new(),
        }
    }
}

/// Backend annotation recovered from a stream's display text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedStore {
    pub code: String,
    pub name: String,
    pub is_cached: bool,
    pub is_proxied: bool,
}

/// The untouched display text the stream arrived with
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawText {
    pub name: String,
    pub description: String,
}

/// Canonical metadata for one raw stream; season/episode are -1 when unset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub addon_name: String,
    pub title: String,
    pub resolution: String,
    pub quality: String,
    pub codec: String,
    pub bit_depth: String,
    pub hdr: Vec<String>,
    pub audio: Vec<String>,
    pub channels: Vec<String>,
    pub languages: Vec<String>,
    pub size: String,
    pub site: String,
    pub hash: String,
    pub file: ExtractedFile,
    pub season: i64,
    pub episode: i64,
    pub seasons: Vec<i64>,
    pub episodes: Vec<i64>,
    pub category: String,
    pub store: ExtractedStore,
    pub raw: RawText,
}

impl Default for Extraction {
    fn default() -> Self {
        Extraction {
            addon_name: String::new(),
            title: String::new(),
            resolution: String::new(),
            quality: String::new(),
            codec: String::new(),
            bit_depth: String::new(),
            hdr: Vec::new(),
            audio: Vec::new(),
            channels: Vec::new(),
            languages: Vec::new(),
            size: String::new(),
            site: String::new(),
            hash: String::new(),
            file: ExtractedFile::default(),
            season: -1,
            episode: -1,
            seasons: Vec::new(),
            episodes: Vec::new(),
            category: String::new(),
            store: ExtractedStore::default(),
            raw: RawText::default(),
        }
    }
}

static NON_ALPHA: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z]").unwrap());

/// code↔name table for the known backends
const STORE_TABLE: [(&str, &str); 8] = [
    ("ad", "alldebrid"),
    ("dl", "debridlink"),
    ("ed", "easydebrid"),
    ("oc", "offcloud"),
    ("pm", "premiumize"),
    ("pp", "pikpak"),
    ("rd", "realdebrid"),
    ("tb", "torbox"),
];

/// Store code for a lowercased, alpha-only store name
pub fn store_code_for_name(name: &str) -> Option<&'static str> {
    STORE_TABLE
        .iter()
        .find(|(_, n)| *n == name)
        .map(|(c, _)| *c)
}

/// Store name for a lowercased store code
pub fn store_name_for_code(code: &str) -> Option<&'static str> {
    STORE_TABLE
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, n)| *n)
}

impl Extraction {
    /// Cross-derive store code and name, canonicalizing legacy 3-letter codes.
    ///
    /// Invariant: a set name with no code derives the code (and vice versa)
    /// through the fixed table; `PKP`/`TRB` fold into `PP`/`TB`.
    pub fn finish_store(&mut self) {
        if self.store.code.is_empty() && !self.store.name.is_empty() {
            let name = NON_ALPHA
                .replace_all(&self.store.name, "")
                .to_lowercase();
            if let Some(code) = store_code_for_name(&name) {
                self.store.code = code.to_uppercase();
            }
        }
        if !self.store.code.is_empty() {
            self.store.code = self.store.code.to_uppercase();
            match self.store.code.as_str() {
                "PKP" => self.store.code = "PP".to_string(),
                "TRB" => self.store.code = "TB".to_string(),
                _ => {}
            }
            self.store.name = store_name_for_code(&self.store.code.to_lowercase())
                .unwrap_or_default()
                .to_string();
        }
    }
}

/// Canonical spelling for well-known codec labels
pub fn normalize_codec(codec: &str) -> String {
    match codec.to_lowercase().as_str() {
        "x264" | "h264" | "avc" => "AVC".to_string(),
        "x265" | "h265" | "hevc" => "HEVC".to_string(),
        "av1" => "AV1".to_string(),
        "xvid" => "XviD".to_string(),
        "mpeg" => "MPEG".to_string(),
        _ => codec.to_string(),
    }
}
