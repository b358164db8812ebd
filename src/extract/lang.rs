//! Language tables for extraction and display
//!
//! Upstream addons label languages however they like: full names, flag
//! emoji, release-group shorthand. Extraction normalizes everything to a
//! short code; rendering maps codes back to flag emoji.

/// Map a lowercased language label (name or flag emoji) to its code
pub fn name_to_code(name: &str) -> Option<&'static str> {
    let code = match name {
        "dubbed" => "dub",
        "dual audio" => "daud",
        "multi audio" => "maud",
        "multi subs" => "msub",
        "english" | "🇬🇧" | "🇺🇸" => "en",
        "japanese" | "🇯🇵" => "ja",
        "russian" | "🇷🇺" => "ru",
        "italian" | "🇮🇹" => "it",
        "portuguese" | "🇵🇹" => "pt",
        "spanish" | "🇪🇸" => "es",
        "latino" => "es-419",
        "🇲🇽" => "es-mx",
        "korean" | "🇰🇷" => "ko",
        "chinese" | "🇨🇳" => "zh",
        "taiwanese" | "🇹🇼" => "zh-tw",
        "french" | "🇫🇷" => "fr",
        "german" | "🇩🇪" => "de",
        "dutch" | "🇳🇱" => "nl",
        "hindi" | "🇮🇳" => "hi",
        "telugu" => "te",
        "tamil" => "ta",
        "malayalam" => "ml",
        "kannada" => "kn",
        "marathi" => "mr",
        "gujarati" => "gu",
        "punjabi" => "pa",
        "bengali" | "🇧🇩" => "bn",
        "polish" | "🇵🇱" => "pl",
        "lithuanian" | "🇱🇹" => "lt",
        "latvian" | "🇱🇻" => "lv",
        "estonian" | "🇪🇪" => "et",
        "czech" | "🇨🇿" => "cs",
        "slovakian" | "🇸🇰" => "sk",
        "slovenian" | "🇸🇮" => "sl",
        "hungarian" | "🇭🇺" => "hu",
        "romanian" | "🇷🇴" => "ro",
        "bulgarian" | "🇧🇬" => "bg",
        "serbian" | "🇷🇸" => "sr",
        "croatian" | "🇭🇷" => "hr",
        "ukrainian" | "🇺🇦" => "uk",
        "greek" | "🇬🇷" => "el",
        "danish" | "🇩🇰" => "da",
        "finnish" | "🇫🇮" => "fi",
        "swedish" | "🇸🇪" => "sv",
        "norwegian" | "🇳🇴" => "no",
        "turkish" | "🇹🇷" => "tr",
        "arabic" | "🇸🇦" => "ar",
        "persian" | "🇮🇷" => "fa",
        "hebrew" | "🇮🇱" => "he",
        "vietnamese" | "🇻🇳" => "vi",
        "indonesian" | "🇮🇩" => "id",
        "malay" | "🇲🇾" => "ms",
        "thai" | "🇹🇭" => "th",
        _ => return None,
    };
    Some(code)
}

/// Map a language code to its display emoji; unknown codes pass through
pub fn code_to_emoji(code: &str) -> &str {
    match code {
        "dub" => "🗣️",
        "daud" => "🔉",
        "maud" => "🔊",
        "msub" => "🔤",
        "en" => "🇬🇧",
        "ja" => "🇯🇵",
        "ru" => "🇷🇺",
        "it" => "🇮🇹",
        "pt" => "🇵🇹",
        "es" => "🇪🇸",
        "es-419" | "es-mx" => "🇲🇽",
        "ko" => "🇰🇷",
        "zh" => "🇨🇳",
        "zh-tw" => "🇹🇼",
        "fr" => "🇫🇷",
        "de" => "🇩🇪",
        "nl" => "🇳🇱",
        "hi" | "te" | "ta" | "ml" | "kn" | "mr" | "gu" | "pa" => "🇮🇳",
        "bn" => "🇧🇩",
        "pl" => "🇵🇱",
        "lt" => "🇱🇹",
        "lv" => "🇱🇻",
        "et" => "🇪🇪",
        "cs" => "🇨🇿",
        "sk" => "🇸🇰",
        "sl" => "🇸🇮",
        "hu" => "🇭🇺",
        "ro" => "🇷🇴",
        "bg" => "🇧🇬",
        "sr" => "🇷🇸",
        "hr" => "🇭🇷",
        "uk" => "🇺🇦",
        "el" => "🇬🇷",
        "da" => "🇩🇰",
        "fi" => "🇫🇮",
        "sv" => "🇸🇪",
        "no" => "🇳🇴",
        "tr" => "🇹🇷",
        "ar" => "🇸🇦",
        "fa" => "🇮🇷",
        "he" => "🇮🇱",
        "vi" => "🇻🇳",
        "id" => "🇮🇩",
        "ms" => "🇲🇾",
        "th" => "🇹🇭",
        other => other,
    }
}
