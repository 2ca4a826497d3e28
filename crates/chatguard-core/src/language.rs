//! Supported language codes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A language, script, or transliteration variant with its own keyword list.
///
/// The set is closed: keyword lists are keyed by [`LanguageCode::code`], and
/// anything outside [`LanguageCode::SUPPORTED`] is never matched against.
/// [`LanguageCode::Unknown`] exists only as a display fallback for messages
/// whose language could not be determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LanguageCode {
    #[serde(rename = "eng")]
    English,
    #[serde(rename = "hin")]
    Hindi,
    /// Romanized Hindi
    #[serde(rename = "hing")]
    Hinglish,
    #[serde(rename = "mar")]
    Marathi,
    #[serde(rename = "tam")]
    Tamil,
    #[serde(rename = "tel")]
    Telugu,
    #[serde(rename = "kan")]
    Kannada,
    #[serde(rename = "mal")]
    Malayalam,
    #[serde(rename = "pan")]
    Punjabi,
    #[serde(rename = "guj")]
    Gujarati,
    #[serde(rename = "ben")]
    Bengali,
    #[serde(rename = "und")]
    Unknown,
}

impl LanguageCode {
    /// Languages that carry keyword lists, in matching order.
    pub const SUPPORTED: [LanguageCode; 11] = [
        Self::English,
        Self::Hindi,
        Self::Hinglish,
        Self::Marathi,
        Self::Tamil,
        Self::Telugu,
        Self::Kannada,
        Self::Malayalam,
        Self::Punjabi,
        Self::Gujarati,
        Self::Bengali,
    ];

    /// Short code used for list file names and serialization
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "eng",
            Self::Hindi => "hin",
            Self::Hinglish => "hing",
            Self::Marathi => "mar",
            Self::Tamil => "tam",
            Self::Telugu => "tel",
            Self::Kannada => "kan",
            Self::Malayalam => "mal",
            Self::Punjabi => "pan",
            Self::Gujarati => "guj",
            Self::Bengali => "ben",
            Self::Unknown => "und",
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "Hindi",
            Self::Hinglish => "Hinglish",
            Self::Marathi => "Marathi",
            Self::Tamil => "Tamil",
            Self::Telugu => "Telugu",
            Self::Kannada => "Kannada",
            Self::Malayalam => "Malayalam",
            Self::Punjabi => "Punjabi",
            Self::Gujarati => "Gujarati",
            Self::Bengali => "Bengali",
            Self::Unknown => "Unknown",
        }
    }

    /// Whether this code has a keyword list
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Map a dataset language name ("Hindi", "hindi/hinglish", "tamil") to a code.
    ///
    /// Unrecognized names fall back to matching their first three letters
    /// against the short codes.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        let code = match name.as_str() {
            "english" => Self::English,
            "hindi" => Self::Hindi,
            "hinglish" | "hindi/hinglish" | "hing" => Self::Hinglish,
            "marathi" => Self::Marathi,
            "tamil" => Self::Tamil,
            "telugu" => Self::Telugu,
            "kannada" => Self::Kannada,
            "malayalam" => Self::Malayalam,
            "punjabi" => Self::Punjabi,
            "gujarati" => Self::Gujarati,
            "bengali" => Self::Bengali,
            other => {
                let prefix: String = other.chars().take(3).collect();
                return prefix.parse().ok().filter(LanguageCode::is_supported);
            }
        };
        Some(code)
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for LanguageCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "eng" => Ok(Self::English),
            "hin" => Ok(Self::Hindi),
            "hing" => Ok(Self::Hinglish),
            "mar" => Ok(Self::Marathi),
            "tam" => Ok(Self::Tamil),
            "tel" => Ok(Self::Telugu),
            "kan" => Ok(Self::Kannada),
            "mal" => Ok(Self::Malayalam),
            "pan" => Ok(Self::Punjabi),
            "guj" => Ok(Self::Gujarati),
            "ben" => Ok(Self::Bengali),
            "und" => Ok(Self::Unknown),
            other => Err(format!("unknown language code: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip() {
        for lang in LanguageCode::SUPPORTED {
            assert_eq!(lang.code().parse::<LanguageCode>().unwrap(), lang);
        }
        assert!("xyz".parse::<LanguageCode>().is_err());
    }

    #[test]
    fn test_from_name() {
        assert_eq!(LanguageCode::from_name("Hindi"), Some(LanguageCode::Hindi));
        assert_eq!(
            LanguageCode::from_name("Hindi/Hinglish"),
            Some(LanguageCode::Hinglish)
        );
        assert_eq!(LanguageCode::from_name("tamil "), Some(LanguageCode::Tamil));
        assert_eq!(LanguageCode::from_name("benglish"), Some(LanguageCode::Bengali));
        assert_eq!(LanguageCode::from_name("klingon"), None);
        assert_eq!(LanguageCode::from_name("undefined"), None);
    }

    #[test]
    fn test_serde_uses_short_code() {
        let json = serde_json::to_string(&LanguageCode::Hinglish).unwrap();
        assert_eq!(json, "\"hing\"");
        let lang: LanguageCode = serde_json::from_str("\"tel\"").unwrap();
        assert_eq!(lang, LanguageCode::Telugu);
    }
}
