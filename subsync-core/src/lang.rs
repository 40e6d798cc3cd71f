//! Language-code normalization for the remote platform.
//!
//! The platform expects regional variants for some languages (`pt` must be
//! `pt-BR`, `es` must be `es-US`, …). Normalization happens when a filename
//! is parsed, so local, manifest, and remote keys all agree on the same
//! spelling.

/// Languages the platform requires a regional variant for.
const REGIONAL_MAP: &[(&str, &str)] = &[
    ("ar", "ar"),
    ("bn", "bn"),
    ("nl", "nl-NL"),
    ("nl-nl", "nl-NL"),
    ("fr", "fr-FR"),
    ("fr-fr", "fr-FR"),
    ("de", "de-DE"),
    ("de-de", "de-DE"),
    ("hi", "hi"),
    ("id", "id"),
    ("it", "it"),
    ("ja", "ja"),
    ("ko", "ko"),
    ("ml", "ml"),
    ("pl", "pl"),
    ("pt", "pt-BR"),
    ("pt-br", "pt-BR"),
    ("pa", "pa"),
    ("ru", "ru"),
    ("es", "es-US"),
    ("es-us", "es-US"),
    ("ta", "ta"),
    ("te", "te"),
    ("uk", "uk"),
    ("en", "en"),
    ("en-us", "en-US"),
    ("en-gb", "en-GB"),
    ("zh", "zh"),
    ("zh-cn", "zh-CN"),
    ("zh-tw", "zh-TW"),
    ("zh-hk", "zh-HK"),
];

/// Language codes the platform accepts for caption tracks (base codes;
/// regional variants map onto these).
const SUPPORTED: &[&str] = &[
    "aa", "ab", "af", "ak", "am", "an", "ar", "as", "av", "ay", "az", "ba", "be", "bg", "bh",
    "bi", "bm", "bn", "bo", "br", "bs", "ca", "ce", "ch", "co", "cr", "cs", "cu", "cv", "cy",
    "da", "de", "de-de", "dv", "dz", "ee", "el", "en", "en-us", "en-gb", "eo", "es", "es-us",
    "et", "eu", "fa", "ff", "fi", "fj", "fo", "fr", "fr-fr", "fy", "ga", "gd", "gl", "gn",
    "gu", "gv", "ha", "he", "hi", "ho", "hr", "ht", "hu", "hy", "hz", "ia", "id", "ie", "ig",
    "ii", "ik", "io", "is", "it", "iu", "ja", "jv", "ka", "kg", "ki", "kj", "kk", "kl", "km",
    "kn", "ko", "kr", "ks", "ku", "kv", "kw", "ky", "la", "lb", "lg", "li", "ln", "lo", "lt",
    "lu", "lv", "mg", "mh", "mi", "mk", "ml", "mn", "mo", "mr", "ms", "mt", "my", "na", "nb",
    "nd", "ne", "ng", "nl", "nl-nl", "nn", "no", "nr", "nv", "ny", "oc", "oj", "om", "or",
    "os", "pa", "pi", "pl", "ps", "pt", "pt-br", "qu", "rm", "rn", "ro", "ru", "rw", "sa",
    "sc", "sd", "se", "sg", "sh", "si", "sk", "sl", "sm", "sn", "so", "sq", "sr", "ss", "st",
    "su", "sv", "sw", "ta", "te", "tg", "th", "ti", "tk", "tl", "tn", "to", "tr", "ts", "tt",
    "tw", "ty", "ug", "uk", "ur", "uz", "ve", "vi", "vo", "wa", "wo", "xh", "yi", "yo", "za",
    "zh", "zh-cn", "zh-tw", "zh-hk", "zu",
];

/// Normalize a language code to the platform's expected spelling.
///
/// Unknown codes pass through unchanged.
pub fn normalize(code: &str) -> String {
    let lower = code.trim().to_ascii_lowercase();
    REGIONAL_MAP
        .iter()
        .find(|(from, _)| *from == lower)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or(lower)
}

/// Whether the platform accepts this code for caption tracks.
pub fn is_supported(code: &str) -> bool {
    let lower = code.to_ascii_lowercase();
    SUPPORTED.contains(&lower.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regional_variants_are_applied() {
        assert_eq!(normalize("pt"), "pt-BR");
        assert_eq!(normalize("es"), "es-US");
        assert_eq!(normalize("fr"), "fr-FR");
        assert_eq!(normalize("EN-GB"), "en-GB");
    }

    #[test]
    fn plain_codes_pass_through_lowercased() {
        assert_eq!(normalize("en"), "en");
        assert_eq!(normalize("JA"), "ja");
        assert_eq!(normalize("xx"), "xx");
    }

    #[test]
    fn supported_check_is_case_insensitive() {
        assert!(is_supported("en"));
        assert!(is_supported("PT-BR"));
        assert!(!is_supported("klingon"));
    }
}
