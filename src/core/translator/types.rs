use crate::shared::types::LangTag;

/// One translation job as issued by the session. Ephemeral, created per
/// trigger firing.
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    pub text: String,
    pub source: LangTag,
    pub target: LangTag,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, source: LangTag, target: LangTag) -> Self {
        Self {
            text: text.into(),
            source,
            target,
        }
    }

    /// Wire form of the language pair, e.g. `en-GB|yo-NG`.
    pub fn langpair(&self) -> String {
        format!("{}|{}", self.source.code(), self.target.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn langpair_uses_wire_codes() {
        let request = TranslationRequest::new(
            "Hello",
            "en-GB".parse().unwrap(),
            "yo-NG".parse().unwrap(),
        );
        assert_eq!(request.langpair(), "en-GB|yo-NG");
    }
}
