//! Parsing of local subtitle filenames.
//!
//! Files follow the loose `VIDEOID_LANGUAGE.<ext>` convention. The video id
//! may itself contain underscores, so the split is on the *right-most*
//! underscore. Parsing is pure; invalid names are a tagged result, never an
//! error.

use crate::lang;
use crate::types::SubtitleKey;

/// Extensions treated as subtitle files. Anything else is ignored by the
/// scanner without comment.
pub const SUBTITLE_EXTENSIONS: &[&str] = &["srt", "vtt", "sbv"];

/// Result of parsing one filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedFilename {
    /// A well-formed subtitle filename. The language code is normalized.
    Parsed { key: SubtitleKey },
    /// A subtitle-extension file that does not match the convention.
    Invalid { reason: String },
}

/// Whether `file_name` carries a subtitle extension at all.
pub fn has_subtitle_extension(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| SUBTITLE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Parse `VIDEOID_LANGUAGE.<ext>` into a [`SubtitleKey`].
///
/// Call only for names where [`has_subtitle_extension`] is true; other files
/// are not subtitle candidates and should be skipped silently.
pub fn parse(file_name: &str) -> ParsedFilename {
    let Some((stem, ext)) = file_name.rsplit_once('.') else {
        return ParsedFilename::Invalid {
            reason: format!("'{file_name}' has no extension"),
        };
    };
    if !SUBTITLE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
        return ParsedFilename::Invalid {
            reason: format!("'{file_name}' has unsupported extension '.{ext}'"),
        };
    }

    let Some((video, language)) = stem.rsplit_once('_') else {
        return ParsedFilename::Invalid {
            reason: format!("'{file_name}' must be named VIDEOID_LANGUAGE.{ext}"),
        };
    };
    if video.is_empty() || language.is_empty() {
        return ParsedFilename::Invalid {
            reason: format!("'{file_name}' must be named VIDEOID_LANGUAGE.{ext}"),
        };
    }

    ParsedFilename::Parsed {
        key: SubtitleKey::new(video, lang::normalize(language)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(name: &str) -> SubtitleKey {
        match parse(name) {
            ParsedFilename::Parsed { key } => key,
            ParsedFilename::Invalid { reason } => panic!("expected parse of '{name}': {reason}"),
        }
    }

    #[test]
    fn simple_name_parses() {
        let key = parsed("abc123_en.srt");
        assert_eq!(key.video.0, "abc123");
        assert_eq!(key.language.0, "en");
    }

    #[test]
    fn video_id_may_contain_underscores() {
        let key = parsed("a_b_c123_fr.vtt");
        assert_eq!(key.video.0, "a_b_c123");
        assert_eq!(key.language.0, "fr-FR");
    }

    #[test]
    fn language_is_normalized() {
        let key = parsed("abc123_pt.srt");
        assert_eq!(key.language.0, "pt-BR");
    }

    #[test]
    fn missing_underscore_is_invalid() {
        assert!(matches!(
            parse("abc123.srt"),
            ParsedFilename::Invalid { .. }
        ));
    }

    #[test]
    fn empty_sides_are_invalid() {
        assert!(matches!(parse("_en.srt"), ParsedFilename::Invalid { .. }));
        assert!(matches!(parse("abc123_.srt"), ParsedFilename::Invalid { .. }));
    }

    #[test]
    fn non_subtitle_extension_is_invalid() {
        assert!(matches!(parse("abc123_en.txt"), ParsedFilename::Invalid { .. }));
        assert!(!has_subtitle_extension("notes.txt"));
        assert!(has_subtitle_extension("abc123_en.SRT"));
    }
}
