//! Text normalization applied to messages and keywords before matching

/// Canonicalize text for keyword matching.
///
/// Lower-cases, replaces emoji and punctuation with spaces (so "k.i.l.l"
/// becomes "k i l l"), collapses runs of three or more identical Latin
/// letters to two ("sooooo" -> "soo"), and squeezes whitespace. The
/// apostrophe survives because transliterations use it.
///
/// The function is pure and idempotent.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;
    let mut last: Option<char> = None;
    let mut run = 0usize;

    for c in lowered.chars() {
        let c = if is_separator(c) { ' ' } else { c };

        if c.is_whitespace() {
            pending_space = !out.is_empty();
            last = None;
            run = 0;
            continue;
        }

        if pending_space {
            out.push(' ');
            pending_space = false;
        }

        if Some(c) == last {
            run += 1;
        } else {
            last = Some(c);
            run = 1;
        }

        if run > 2 && c.is_ascii_alphabetic() {
            continue;
        }
        out.push(c);
    }

    out
}

/// Characters replaced by a space before matching
fn is_separator(c: char) -> bool {
    if c == '\'' {
        return false;
    }
    c.is_ascii_punctuation() || is_emoji_like(c)
}

/// Emoji, dingbats, private-use glyphs, and general punctuation/symbol blocks
fn is_emoji_like(c: char) -> bool {
    matches!(c as u32,
        0x2011..=0x26FF
        | 0x2700..=0x27BF
        | 0xE000..=0xF8FF
        | 0xFE0F
        | 0x1_0000..=0x10_FFFF
    )
}

/// True when a normalized keyword is plain Latin (letters, digits,
/// apostrophes, spaces) and should be matched on word boundaries.
pub fn is_latin_keyword(normalized: &str) -> bool {
    !normalized.is_empty()
        && normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '\'' || c == ' ')
}
