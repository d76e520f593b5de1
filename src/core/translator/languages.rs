use crate::shared::types::LangTag;

/// Locale codes offered by the language pickers, with display names.
pub const LANGUAGES: &[(&str, &str)] = &[
    ("en-GB", "English (UK)"),
    ("en-US", "English (US)"),
    ("yo-NG", "Yoruba"),
    ("ig-NG", "Igbo"),
    ("ha-NE", "Hausa"),
    ("sw-KE", "Swahili"),
    ("fr-FR", "French"),
    ("de-DE", "German"),
    ("es-ES", "Spanish"),
    ("it-IT", "Italian"),
    ("pt-PT", "Portuguese"),
    ("nl-NL", "Dutch"),
    ("pl-PL", "Polish"),
    ("ru-RU", "Russian"),
    ("tr-TR", "Turkish"),
    ("ar-SA", "Arabic"),
    ("hi-IN", "Hindi"),
    ("zh-CN", "Chinese (Simplified)"),
    ("ja-JP", "Japanese"),
    ("ko-KR", "Korean"),
];

/// Human-readable name for a language tag.
///
/// Unlisted tags fall back to the ISO 639 language name, so a tag parsed
/// from user input always renders something sensible.
pub fn display_name(tag: &LangTag) -> String {
    let code = tag.code();
    LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| tag.language().to_name().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listed_codes_use_the_table_name() {
        let tag: LangTag = "yo-NG".parse().unwrap();
        assert_eq!(display_name(&tag), "Yoruba");
    }

    #[test]
    fn unlisted_codes_fall_back_to_the_language_name() {
        let tag: LangTag = "fi".parse().unwrap();
        assert_eq!(display_name(&tag), "Finnish");
    }

    #[test]
    fn every_listed_code_parses() {
        for (code, _) in LANGUAGES {
            assert!(code.parse::<LangTag>().is_ok(), "{} should parse", code);
        }
    }
}
