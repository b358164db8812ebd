//! Seed rulesets for well-known upstream output formats
//!
//! Config can reference these by name instead of carrying an inline blob.

use once_cell::sync::Lazy;

const CODEC_PATTERN: &str = "hevc|avc|mpeg|xvid|av1|x264|x265|h264|h265";
const QUALITY_PATTERN: &str = r"\b(?:(?:blu.?ray|bd|br)[ .-]?(?:rip|remux)?|(?:web|dvd|sat|vhs|r5|scr)[ .-]?(?:dl|scr)?[ .-]?(?:mux|rip)?|(?:hc|(?:hd|pd)?tv)[ .-]?(?:rip|scr)?|(?:hd)?cam[ .-]?rip|(?:(?:tele)(?:sync|cine))|(?:hd[ .-]?)?(?:tc|ts))\b";

static TORRENTIO: Lazy<String> = Lazy::new(|| {
    format!(
        r"name
(?i)^(?:\[(?<store_code>\w+?)(?:(?<store_is_cached>\+?)| download)\] )?(?<addon_name>\w+)(?:\n(?:(?<resolution>\d+[kp])? ?)?(?:(?<quality>{q})? ?)?(?:(?:3D(?: SBS)) ?)?(?<hdr>[^| ]+(?:(?<hdr_sep> \| )[^| ]+)*)?)?

bingeGroup
(?i)(?<codec>{c})
(?i)(?<bitdepth>\d+bit)
(?i)(?<quality>{q})

filename
(?i)(?<codec>{c})

description
^(?<t_title>.+)\n(?:(?<file_name>[^👤].+)\n)?👤.+ 💾 (?<size>.+) ⚙️ (?<site>\w+)(?:\n(?<language>[^\/]+(?:(?<language_sep>\/)[^\/]+)*))?$
(?i)(?<quality>{q})

url
(?i)\/(?<hash>[a-f0-9]{{40}})\/[^/]+\/(?:(?<file_idx>\d+)|null|undefined)\/",
        q = QUALITY_PATTERN,
        c = CODEC_PATTERN,
    )
});

static COMET: Lazy<String> = Lazy::new(|| {
    format!(
        r"name
(?i)^\[(?:TORRENT🧲|(?<store_code>\w+)(?:(?<store_is_cached>⚡)|⬇️)?)\] (?<addon_name>.+) (?:unknown|(?<resolution>\d[^kp]*[kp]))

description
^(?<t_title>.+)\n(?:💿 .+\n)?(?:👤 \d+ )?💾 (?:(?<size>[\d.]+ [^ ]+)|.+?) 🔎 (?<site>.+)(?:\n(?<language>[^/]+(?:(?<language_sep>\/)[^/]+)*))?
(?i)💿 (?:.+\|)?(?<quality>{q})
(?i)💿 (?:.+\|)?(?<codec>{c})

url
\/playback\/(?<hash>[a-f0-9]{{40}})\/(?:n|(?<file_idx>\d+))\/[^/]+\/(?:n|(?<season>\d+))\/(?:n|(?<episode>\d+))\/(?<file_name>.+)",
        q = QUALITY_PATTERN,
        c = CODEC_PATTERN,
    )
});

static DEBRIDIO: Lazy<String> = Lazy::new(|| {
    r"name
(?i)^(?:\[(?<store_code>\w+?)(?<store_is_cached>\+?)\] \n)?(?<addon_name>\w+) (?:Other|(?<resolution>\d[^kp]*[kp]))

description
^(?<t_title>.+?) ?\n(?:(?<file_name>.+?) ?\n)?⚡? 📺 (?<resolution>[^ ]+) 💾 (?:Unknown|(?<size>[\d.]+ [^ ]+)|.+?) (?:👤 (?:Unknown|\d+))? ⚙️ (?<site>[^ ]+)(?: \n🌐 (?<language>[^|]+(?:(?<language_sep>\|)[^|]+)*))?

url
\/(?<hash>[a-f0-9]{40})(?:\/(?<season>\d+)\/(?<episode>\d+))?"
        .to_string()
});

static MEDIAFUSION: Lazy<String> = Lazy::new(|| {
    format!(
        r"name
(?i)^(?<addon_name>\w+(?: \| [^ ]+)?) (?:P2P|(?<store_code>[A-Z]{{2,3}})) (?:N\/A|(?<resolution>[^kp]+[kp])) (?<store_is_cached>⚡️)?

description
(?i)(?:📂 (?<t_title>.+?)(?: ┈➤ (?<file_name>.+))?\n)?(?:(?:📺 .+)?(?: 🎞️ .+)?(?: 🎵 .+)?\n)?💾 (?:(?<file_size>.+?) \/ 💾 )?(?<size>.+?)(?: 👤 \d+)?\n(?:.+\n)?🔗 (?<site>.+?)(?: 🧑‍💻 |$)

bingeGroup
(?i)-(?:🎨 (?<hdr>[^| ]+(?:(?<hdr_sep>\|)[^| ]+)*) )?📺 (?<quality>{q})(?: ?🎞️ (?<codec>[^- ]+))?(?: ?🎵 .+)?-(?:N\/A|(?:\d+[kp]))

filename
(?i)(?<quality>{q})
(?i)(?<codec>{c})

url
\/stream\/(?<hash>[a-f0-9]{{40}})(?:\/(?<season>\d+)\/(?<episode>\d+)\/?)?",
        q = QUALITY_PATTERN,
        c = CODEC_PATTERN,
    )
});

static PEERFLIX: Lazy<String> = Lazy::new(|| {
    r"name
(?i)^(?:\[(?<store_code>\w+?)(?:(?<store_is_cached>\+?)|\s[^\]]+)\] )?(?<addon_name>\w+) \S+ (?:\w+-)?(?<resolution>\d+[kp])?

description
^(?<t_title>[^\n]+)\n(?:(?<file_name>.+)\n)?.+👤 \d+ (?:💾 (?<size>[\d.]+ \w[bB]) )?🌐 (?<site>\w+)$

url
(?i)\/(?<hash>[a-f0-9]{40})\/[^/]+\/(?:(?<file_idx>\d+)|null|undefined)\/"
        .to_string()
});

// The upstream format alternates two name layouts; they live as separate
// patterns because capture names must be unique within one pattern.
static ORION: Lazy<String> = Lazy::new(|| {
    r"name
🪐 (?<addon_name>\w+) 📺 (?<resolution>\w+)
(?<store_is_cached>🚀) (?<addon_name>\w+)\n.*\[(?<store_name>[^\]]+)\]

description
(?<t_title>.+)\n(?:📺(?<resolution>.+?) )?💾(?<size>[0-9.]+ [^ ]+) (?:👤\d+ )?🎥(?<codec>\w+) 🔊(?:(?<channel>\d\.\d)|.+)\n👂(?<language>[A-Z]+(?:(?<language_sep> )[A-Z]+)*) ☁️(?<site>.+)"
        .to_string()
});

/// Look up a seed ruleset by name (case-insensitive)
pub fn ruleset(name: &str) -> Option<&'static str> {
    match name.to_lowercase().as_str() {
        "torrentio" => Some(TORRENTIO.as_str()),
        "comet" => Some(COMET.as_str()),
        "debridio" => Some(DEBRIDIO.as_str()),
        "mediafusion" => Some(MEDIAFUSION.as_str()),
        "peerflix" => Some(PEERFLIX.as_str()),
        "orion" => Some(ORION.as_str()),
        _ => None,
    }
}

pub fn names() -> &'static [&'static str] {
    &[
        "torrentio",
        "comet",
        "debridio",
        "mediafusion",
        "peerflix",
        "orion",
    ]
}
