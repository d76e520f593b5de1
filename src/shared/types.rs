use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use isolang::Language;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::shared::error::AppError;

fn lang_code(lang: &Language) -> String {
    lang.to_639_1()
        .map(|c| c.to_string())
        .unwrap_or_else(|| lang.to_639_3().to_string())
}

/// A locale-style language tag such as `en-GB` or `yo-NG`.
///
/// The primary subtag must be a known ISO 639 code; the optional region
/// subtag is kept verbatim (uppercased) because the translation provider
/// distinguishes regional variants in its `langpair` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LangTag {
    language: Language,
    region: Option<String>,
}

impl LangTag {
    pub fn new(language: Language, region: Option<String>) -> Self {
        Self {
            language,
            region: region.map(|r| r.to_ascii_uppercase()),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// The wire form used in `langpair`, e.g. `en-GB`.
    pub fn code(&self) -> String {
        match &self.region {
            Some(region) => format!("{}-{}", lang_code(&self.language), region),
            None => lang_code(&self.language),
        }
    }
}

impl FromStr for LangTag {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| {
            Regex::new(r"^([A-Za-z]{2,3})(?:[-_]([A-Za-z]{2}))?$").unwrap()
        });

        let caps = re
            .captures(raw.trim())
            .ok_or_else(|| AppError::Validation(format!("Invalid language tag: {}", raw)))?;

        let primary = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let language = Language::from_639_1(primary.to_ascii_lowercase().as_str())
            .or_else(|| Language::from_639_3(primary.to_ascii_lowercase().as_str()))
            .ok_or_else(|| AppError::Validation(format!("Unsupported language: {}", raw)))?;
        let region = caps.get(2).map(|m| m.as_str().to_string());

        Ok(Self::new(language, region))
    }
}

impl fmt::Display for LangTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for LangTag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.code())
    }
}

impl<'de> Deserialize<'de> for LangTag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One completed translation, as kept in the recent-translations record.
///
/// Entries are never mutated after creation; they only age out of the
/// capacity-bounded collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub text: String,
    pub translation: String,
    pub from: LangTag,
    pub to: LangTag,
    pub date: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(text: String, translation: String, from: LangTag, to: LangTag) -> Self {
        Self {
            text,
            translation,
            from,
            to,
            date: Utc::now(),
        }
    }

    /// History dedup key: same source text and language pair.
    pub fn matches(&self, text: &str, from: &LangTag, to: &LangTag) -> bool {
        self.text == text && &self.from == from && &self.to == to
    }
}

/// A translation pinned by the user. Unbounded, removed only on request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub text: String,
    pub translation: String,
    pub from: LangTag,
    pub to: LangTag,
}
