//! Conversion of localized decimal digits to ASCII
//!
//! Catalog pages render version strings in the reader's script, e.g. `۲.۴.۱`
//! on a Persian page. Versions are compared as strings, so every digit must be
//! folded to ASCII before it reaches the stores.

/// First code point (the zero) of each contiguous decimal digit block.
const DIGIT_ZEROS: &[u32] = &[
    0x0660, // Arabic-Indic
    0x06F0, // Extended Arabic-Indic (Persian, Urdu)
    0x07C0, // NKo
    0x0966, // Devanagari
    0x09E6, // Bengali
    0x0A66, // Gurmukhi
    0x0AE6, // Gujarati
    0x0B66, // Oriya
    0x0BE6, // Tamil
    0x0C66, // Telugu
    0x0CE6, // Kannada
    0x0D66, // Malayalam
    0x0E50, // Thai
    0x0ED0, // Lao
    0x0F20, // Tibetan
    0x1040, // Myanmar
    0x17E0, // Khmer
    0x1810, // Mongolian
    0xFF10, // Fullwidth
];

/// Returns the ASCII digit for a localized digit glyph, or `None` for any other char.
fn ascii_digit(c: char) -> Option<char> {
    let code = c as u32;
    DIGIT_ZEROS
        .iter()
        .find(|&&zero| (zero..zero + 10).contains(&code))
        .and_then(|&zero| char::from_digit(code - zero, 10))
}

/// Replaces every localized decimal digit with its ASCII equivalent.
///
/// All other characters, ASCII digits included, are kept as they are,
/// so applying this twice gives the same result as applying it once.
pub fn normalize_digits(input: &str) -> String {
    input
        .chars()
        .map(|c| ascii_digit(c).unwrap_or(c))
        .collect()
}
