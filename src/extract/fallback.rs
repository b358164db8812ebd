//! Heuristic extraction for upstreams with no configured ruleset
//!
//! A fixed set of patterns over the concatenated display text. Only fills
//! fields that are still empty, so explicitly addressed values survive.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extract::result::Extraction;

static CODEC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(hevc|avc|mpeg|xvid|av1|x264|x265|h264|h265)\b").unwrap());

static QUALITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:(?:blu.?ray|bd|br)[ .-]?(?:rip|remux)?|(?:web|dvd|sat|vhs|r5|scr)[ .-]?(?:dl|scr)?[ .-]?(?:mux|rip)?|(?:hc|(?:hd|pd)?tv)[ .-]?(?:rip|scr)?|(?:hd)?cam[ .-]?rip|(?:(?:tele)(?:sync|cine))|(?:hd[ .-]?)?(?:tc|ts))\b",
    )
    .unwrap()
});

static RESOLUTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(\d{3,4}p|[248]k)\b").unwrap());

static SIZE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b([\d.]+ \w[bB])\b").unwrap());

static STORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(ad|dl|ed|oc|pp|pm|rd|tb|pkp|trb)\b(\+)?").unwrap());

pub fn apply(r: &mut Extraction) {
    let mut input = r.raw.name.clone();
    if !r.file.name.is_empty() {
        input.push(' ');
        input.push_str(&r.file.name);
    }
    input.push(' ');
    input.push_str(&r.raw.description);

    if r.codec.is_empty() {
        if let Some(m) = CODEC.find(&input) {
            r.codec = m.as_str().to_string();
        }
    }
    if r.quality.is_empty() {
        if let Some(m) = QUALITY.find(&input) {
            r.quality = m.as_str().to_string();
        }
    }
    if r.resolution.is_empty() {
        if let Some(m) = RESOLUTION.find(&input) {
            r.resolution = m.as_str().to_string();
        }
    }
    if r.size.is_empty() {
        if let Some(m) = SIZE.find(&input) {
            r.size = m.as_str().to_string();
        }
    }
    if r.title.is_empty() {
        r.title = r
            .raw
            .description
            .lines()
            .next()
            .unwrap_or_default()
            .to_string();
    }
    if r.store.code.is_empty() {
        if let Some(caps) = STORE.captures(&input) {
            r.store.code = caps[1].to_string();
            if caps.get(2).is_some() || input.contains("⚡️") {
                r.store.is_cached = true;
            }
        }
    }
}
