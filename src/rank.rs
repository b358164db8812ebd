//! Ranking and sorting of extracted streams
//!
//! Each configured field maps to a numeric rank; the sort compares fields
//! in configured order. Streams without an extraction always sort last.

use crate::extract::Extraction;
use crate::models::parse_size_bytes;

/// Sortable fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankField {
    Resolution,
    Quality,
    Size,
}

/// One field of a sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: RankField,
    pub descending: bool,
}

pub const DEFAULT_SORT: &str = "-resolution,-quality,-size";

/// Parse a sort config like `-resolution,quality`; unknown fields are skipped
pub fn parse_sort_config(config: &str) -> Vec<SortSpec> {
    let mut specs = Vec::new();
    for part in config.split(',') {
        let part = part.trim();
        let descending = part.starts_with('-');
        let field = match part.trim_start_matches('-') {
            "resolution" => RankField::Resolution,
            "quality" => RankField::Quality,
            "size" => RankField::Size,
            _ => continue,
        };
        specs.push(SortSpec { field, descending });
    }
    specs
}

/// Quality rank: a fixed ladder by substring containment, first hit wins
pub fn quality_rank(input: &str) -> i64 {
    let quality = input.to_lowercase();

    if quality.contains("remux") {
        return 100;
    }
    if quality.contains("mux") {
        return 99;
    }

    if quality.contains("bluray") {
        return 98;
    }

    // the web family goes before the bare br/bd tokens, else "webdl"
    // would rank as "bd"
    if quality.contains("web") {
        if quality.contains("dl") {
            return 89;
        }
        if quality.contains("rip") {
            return 85;
        }
        return 80;
    }

    if quality.contains("br") {
        return 96;
    }
    if quality.contains("bd") {
        return 94;
    }
    if quality.contains("uhd") {
        return 92;
    }

    if quality.contains("hd") {
        if quality.contains("rip") {
            return 79;
        }
        return 75;
    }

    if quality.contains("dvd") {
        return 60;
    }

    if quality.contains("sat") {
        return 59;
    }
    if quality.contains("tv") {
        return 57;
    }
    if quality.contains("ppv") {
        return 55;
    }

    if quality.contains("cam") {
        return 40;
    }
    if quality.contains("tele") {
        return 30;
    }
    if quality.contains("scr") {
        return 20;
    }
    0
}

/// Resolution rank: `1080p` → 1080, `4k` → 4000, anything else → 0
pub fn resolution_rank(input: &str) -> i64 {
    let input = input.trim().to_lowercase();
    if let Some(prefix) = input.strip_suffix('p') {
        if let Ok(res) = prefix.parse::<i64>() {
            return res;
        }
    }
    if let Some(prefix) = input.strip_suffix('k') {
        if let Ok(res) = prefix.parse::<i64>() {
            return res * 1000;
        }
    }
    0
}

/// Size rank: parsed byte count, unparseable → 0
pub fn size_rank(input: &str) -> i64 {
    parse_size_bytes(input).map(|b| b as i64).unwrap_or(0)
}

pub fn rank(extraction: &Extraction, field: RankField) -> i64 {
    match field {
        RankField::Resolution => resolution_rank(&extraction.resolution),
        RankField::Quality => quality_rank(&extraction.quality),
        RankField::Size => size_rank(&extraction.size),
    }
}

/// Sort items by the configured fields; items without an extraction go
/// last. Ties keep input order, so the result never depends on which
/// upstream answered first.
pub fn sort_streams<T>(
    items: &mut [T],
    specs: &[SortSpec],
    extraction_of: impl Fn(&T) -> Option<&Extraction>,
) {
    if specs.is_empty() {
        return;
    }
    items.sort_by(|a, b| {
        let (a, b) = (extraction_of(a), extraction_of(b));
        match (a, b) {
            (None, None) => std::cmp::Ordering::Equal,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (Some(_), None) => std::cmp::Ordering::Less,
            (Some(a), Some(b)) => {
                for spec in specs {
                    let (ra, rb) = (rank(a, spec.field), rank(b, spec.field));
                    if ra == rb {
                        continue;
                    }
                    return if spec.descending {
                        rb.cmp(&ra)
                    } else {
                        ra.cmp(&rb)
                    };
                }
                std::cmp::Ordering::Equal
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extraction(resolution: &str, quality: &str, size: &str) -> Extraction {
        Extraction {
            resolution: resolution.to_string(),
            quality: quality.to_string(),
            size: size.to_string(),
            ..Extraction::default()
        }
    }

    #[test]
    fn test_quality_ladder() {
        assert_eq!(quality_rank("BluRay REMUX"), 100);
        assert_eq!(quality_rank("WEBDL"), 89);
        assert_eq!(quality_rank("WEBRip"), 85);
        assert_eq!(quality_rank("WEB"), 80);
        assert_eq!(quality_rank("HDRip"), 79);
        assert_eq!(quality_rank("DVD"), 60);
        assert_eq!(quality_rank("CAM"), 40);
        assert_eq!(quality_rank("TeleSync"), 30);
        assert_eq!(quality_rank("SCR"), 20);
        assert_eq!(quality_rank("whatever"), 0);
        assert!(quality_rank("BluRay REMUX") > quality_rank("WEBDL"));
        assert!(quality_rank("WEBDL") > quality_rank("CAM"));
    }

    #[test]
    fn test_quality_precedence_order() {
        // earlier ladder entries win on combined labels
        assert_eq!(quality_rank("BluRay"), 98);
        assert_eq!(quality_rank("BRRip"), 96);
        assert_eq!(quality_rank("BDRip"), 94);
        assert_eq!(quality_rank("UHD"), 92);
    }

    #[test]
    fn test_resolution_rank() {
        assert_eq!(resolution_rank("1080p"), 1080);
        assert_eq!(resolution_rank("720P"), 720);
        assert_eq!(resolution_rank("4k"), 4000);
        assert_eq!(resolution_rank("2K"), 2000);
        assert_eq!(resolution_rank(""), 0);
        assert_eq!(resolution_rank("HD"), 0);
    }

    #[test]
    fn test_size_rank() {
        assert!(size_rank("2.72 GB") < size_rank("40.33 GB"));
        assert_eq!(size_rank("garbage"), 0);
    }

    #[test]
    fn test_parse_sort_config() {
        let specs = parse_sort_config("-resolution, quality,-size,bogus");
        assert_eq!(specs.len(), 3);
        assert_eq!(specs[0].field, RankField::Resolution);
        assert!(specs[0].descending);
        assert_eq!(specs[1].field, RankField::Quality);
        assert!(!specs[1].descending);
        assert_eq!(specs[2].field, RankField::Size);
    }

    #[test]
    fn test_sort_default_order() {
        let mut items = vec![
            Some(extraction("720p", "WEB", "1.0 GB")),
            Some(extraction("2160p", "CAM", "4.0 GB")),
            Some(extraction("1080p", "BluRay", "2.0 GB")),
        ];
        sort_streams(&mut items, &parse_sort_config(DEFAULT_SORT), |i| i.as_ref());
        let resolutions: Vec<_> = items
            .iter()
            .map(|i| i.as_ref().unwrap().resolution.clone())
            .collect();
        assert_eq!(resolutions, vec!["2160p", "1080p", "720p"]);
    }

    #[test]
    fn test_sort_failed_extractions_last() {
        let mut items = vec![
            None,
            Some(extraction("720p", "", "")),
            None,
            Some(extraction("1080p", "", "")),
        ];
        sort_streams(&mut items, &parse_sort_config(DEFAULT_SORT), |i| i.as_ref());
        assert_eq!(items[0].as_ref().unwrap().resolution, "1080p");
        assert_eq!(items[1].as_ref().unwrap().resolution, "720p");
        assert!(items[2].is_none());
        assert!(items[3].is_none());
    }

    #[test]
    fn test_sort_ties_keep_input_order() {
        let mut items = vec![
            Some(extraction("1080p", "WEB", "first")),
            Some(extraction("1080p", "WEB", "second")),
        ];
        sort_streams(&mut items, &parse_sort_config("-resolution,-quality"), |i| {
            i.as_ref()
        });
        assert_eq!(items[0].as_ref().unwrap().size, "first");
        assert_eq!(items[1].as_ref().unwrap().size, "second");
    }

    #[test]
    fn test_sort_ascending_direction() {
        let mut items = vec![
            Some(extraction("1080p", "", "")),
            Some(extraction("720p", "", "")),
        ];
        sort_streams(&mut items, &parse_sort_config("resolution"), |i| i.as_ref());
        assert_eq!(items[0].as_ref().unwrap().resolution, "720p");
    }
}
