//! Extraction rule engine
//!
//! Compiles a plain-text ruleset into regex matchers and applies it to one
//! raw stream. Ruleset format: blank-line-separated sections; the first
//! line of a section picks the source text (`name`, `description`,
//! `bingeGroup`, `filename`, `url`), every following line is one pattern.
//! Named capture groups carry the values into the canonical record.

use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::extract::fallback;
use crate::extract::lang;
use crate::extract::result::{normalize_codec, Extraction};
use crate::models::{format_size, Stream};

/// Ruleset compilation error
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("invalid pattern {pattern:?}: {source}")]
    BadPattern {
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },
}

/// Source text a pattern runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Name,
    Description,
    BingeGroup,
    Filename,
    Url,
}

impl Section {
    fn parse(line: &str) -> Option<Section> {
        match line.trim() {
            "name" => Some(Section::Name),
            "description" => Some(Section::Description),
            "bingeGroup" => Some(Section::BingeGroup),
            "filename" => Some(Section::Filename),
            "url" => Some(Section::Url),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Rule {
    // None for unrecognized section names; patterns still compile, never run
    section: Option<Section>,
    regex: Regex,
}

/// A compiled ruleset
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    rules: Vec<Rule>,
}

impl Extractor {
    /// Compile a ruleset blob; any bad pattern fails the whole compile
    pub fn parse(blob: &str) -> Result<Extractor, ExtractError> {
        let mut rules = Vec::new();
        // None: expecting a section header next
        let mut section: Option<Option<Section>> = None;

        for line in blob.lines() {
            if line.trim().is_empty() {
                section = None;
                continue;
            }
            match section {
                None => section = Some(Section::parse(line)),
                Some(current) => {
                    let regex = Regex::new(line).map_err(|e| ExtractError::BadPattern {
                        pattern: line.to_string(),
                        source: Box::new(e),
                    })?;
                    rules.push(Rule {
                        section: current,
                        regex,
                    });
                }
            }
        }

        Ok(Extractor { rules })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply the ruleset to one raw stream
    pub fn extract(&self, stream: &Stream, category: &str) -> Extraction {
        let mut r = Extraction {
            category: category.to_string(),
            ..Extraction::default()
        };
        r.raw.name = stream.name.clone();
        r.raw.description = stream.description_or_title().to_string();

        let mut hdr_values: Vec<String> = Vec::new();
        let mut hdr_sep = String::new();
        let mut lang_values: Vec<String> = Vec::new();
        let mut lang_sep = String::new();

        for rule in &self.rules {
            let Some(section) = rule.section else {
                continue;
            };
            let hints = stream.behavior_hints.as_ref();
            let source = match section {
                Section::Name => stream.name.as_str(),
                Section::Description => stream.description_or_title(),
                Section::BingeGroup => hints
                    .and_then(|h| h.binge_group.as_deref())
                    .unwrap_or_default(),
                Section::Filename => hints
                    .and_then(|h| h.filename.as_deref())
                    .unwrap_or_default(),
                Section::Url => stream.url.as_str(),
            };
            if source.is_empty() {
                continue;
            }

            for caps in rule.regex.captures_iter(source) {
                for group in rule.regex.capture_names().flatten() {
                    let Some(value) = caps.name(group) else {
                        continue;
                    };
                    let value = value.as_str();
                    if value.is_empty() {
                        continue;
                    }
                    match group {
                        "addon" | "addon_name" => set_if_empty(&mut r.addon_name, value),
                        "bitdepth" => set_if_empty(&mut r.bit_depth, value),
                        "cached" | "store_is_cached" => r.store.is_cached = true,
                        "audio" => r.audio.push(value.to_string()),
                        "channel" => r.channels.push(value.to_string()),
                        "codec" => set_if_empty(&mut r.codec, value),
                        "debrid" | "store_code" => set_if_empty(&mut r.store.code, value),
                        "store_name" => set_if_empty(&mut r.store.name, value),
                        "episode" => {
                            if let Ok(episode) = value.parse::<i64>() {
                                r.episode = episode;
                                if r.episodes.is_empty() {
                                    r.episodes.push(episode);
                                }
                            }
                        }
                        "season" => {
                            if let Ok(season) = value.parse::<i64>() {
                                r.season = season;
                                if r.seasons.is_empty() {
                                    r.seasons.push(season);
                                }
                            }
                        }
                        "fileidx" | "file_idx" => {
                            if let Ok(idx) = value.parse::<i64>() {
                                if r.file.idx == -1 {
                                    r.file.idx = idx;
                                }
                            }
                        }
                        "filename" | "file_name" => {
                            let name = if section == Section::Url {
                                urlencoding::decode(value)
                                    .map(|s| s.into_owned())
                                    .unwrap_or_else(|_| value.to_string())
                            } else {
                                value.to_string()
                            };
                            set_if_empty(&mut r.file.name, &name);
                        }
                        "file_size" => set_if_empty(&mut r.file.size, value),
                        "hash" => set_if_empty(&mut r.hash, value),
                        "hdr" => hdr_values.push(value.to_string()),
                        "hdr_sep" => set_if_empty(&mut hdr_sep, value),
                        "lang" | "language" => lang_values.push(value.to_string()),
                        "lang_sep" | "language_sep" => set_if_empty(&mut lang_sep, value),
                        "quality" => set_if_empty(&mut r.quality, value),
                        "resolution" => set_if_empty(&mut r.resolution, value),
                        "site" => set_if_empty(&mut r.site, value),
                        "size" => set_if_empty(&mut r.size, value),
                        "title" | "t_title" => set_if_empty(&mut r.title, value),
                        _ => {}
                    }
                }
            }
        }

        for value in hdr_values {
            append_split(&mut r.hdr, &value, &hdr_sep, |piece| piece.to_string());
        }
        for value in lang_values {
            append_split(&mut r.languages, &value, &lang_sep, |piece| {
                lang::name_to_code(&piece.to_lowercase())
                    .map(str::to_string)
                    .unwrap_or_else(|| piece.to_string())
            });
        }

        // explicitly addressed streams always win over regex-derived values
        if !stream.info_hash.is_empty() {
            r.hash = stream.info_hash.clone();
            r.file.idx = stream.file_idx.unwrap_or(0);
        }

        if let Some(hints) = stream.behavior_hints.as_ref() {
            if let Some(filename) = hints.filename.as_deref() {
                if !filename.is_empty() {
                    r.file.name = filename.to_string();
                }
            }
            if let Some(video_size) = hints.video_size {
                if video_size > 0 {
                    if r.file.size.is_empty() {
                        r.file.size = format_size(video_size);
                    }
                    if r.size.is_empty() {
                        r.size = r.file.size.clone();
                    }
                }
            }
        }

        if !r.file.name.is_empty() {
            r.file.name = base_name(r.file.name.trim()).to_string();
        }

        if self.rules.is_empty() {
            fallback::apply(&mut r);
        }

        if !r.quality.is_empty() {
            r.quality = r
                .quality
                .trim_matches(|c| c == ' ' || c == '.' || c == '-')
                .to_string();
        }
        if !r.codec.is_empty() {
            r.codec = normalize_codec(&r.codec);
        }

        r.finish_store();

        if r.episode == -1 {
            if let Some(first) = r.episodes.first() {
                r.episode = *first;
            }
        }
        if r.season == -1 {
            if let Some(first) = r.seasons.first() {
                r.season = *first;
            }
        }

        r
    }
}

fn set_if_empty(slot: &mut String, value: &str) {
    if slot.is_empty() {
        *slot = value.to_string();
    }
}

fn append_split(list: &mut Vec<String>, value: &str, sep: &str, map: impl Fn(&str) -> String) {
    if sep.is_empty() {
        let piece = value.trim();
        if !piece.is_empty() {
            list.push(map(piece));
        }
        return;
    }
    for piece in value.split(sep) {
        let piece = piece.trim();
        if !piece.is_empty() {
            list.push(map(piece));
        }
    }
}

fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Compiled-ruleset cache, keyed by blob identity.
///
/// Owned by the pipeline wiring; extraction itself carries no global state.
#[derive(Default)]
pub struct ExtractorCache {
    inner: Mutex<HashMap<String, Arc<Extractor>>>,
}

impl ExtractorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, blob: &str) -> Result<Arc<Extractor>, ExtractError> {
        {
            let cache = self.inner.lock().unwrap();
            if let Some(extractor) = cache.get(blob) {
                return Ok(Arc::clone(extractor));
            }
        }
        let extractor = Arc::new(Extractor::parse(blob)?);
        self.inner
            .lock()
            .unwrap()
            .insert(blob.to_string(), Arc::clone(&extractor));
        Ok(extractor)
    }
}
