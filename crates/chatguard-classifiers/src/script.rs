//! Unicode block sniffing for best-effort language hints
//!
//! Hints are only used to label messages that matched nothing. They never
//! influence whether a message is flagged.

use chatguard_core::LanguageCode;
use std::collections::BTreeSet;

/// Languages implied by the scripts present in `text`.
///
/// Devanagari is reported as Hindi; Marathi shares the script and cannot be
/// told apart without matching.
pub fn script_hints(text: &str) -> BTreeSet<LanguageCode> {
    text.chars().filter_map(script_language).collect()
}

fn script_language(c: char) -> Option<LanguageCode> {
    match c as u32 {
        0x0900..=0x097F => Some(LanguageCode::Hindi),
        0x0980..=0x09FF => Some(LanguageCode::Bengali),
        0x0A00..=0x0A7F => Some(LanguageCode::Punjabi),
        0x0A80..=0x0AFF => Some(LanguageCode::Gujarati),
        0x0B80..=0x0BFF => Some(LanguageCode::Tamil),
        0x0C00..=0x0C7F => Some(LanguageCode::Telugu),
        0x0C80..=0x0CFF => Some(LanguageCode::Kannada),
        0x0D00..=0x0D7F => Some(LanguageCode::Malayalam),
        _ => None,
    }
}
