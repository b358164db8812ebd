//! Extraction engine
//!
//! Turns free-form, addon-specific stream metadata into one canonical
//! shape. Rule-driven when a ruleset is configured, heuristic otherwise.
//!
//! - `extractor` - ruleset compilation and application
//! - `fallback` - heuristics for upstreams without a ruleset
//! - `builtin` - seed rulesets for well-known upstream formats
//! - `result` - the canonical extraction record
//! - `lang` - language normalization tables

pub mod builtin;
pub mod extractor;
pub mod fallback;
pub mod lang;
pub mod result;

pub use extractor::{ExtractError, Extractor, ExtractorCache};
pub use result::{ExtractedFile, ExtractedStore, Extraction};
