//! Text normalization and ASCII fallback for rendered fields.
//!
//! # Invariants
//! - Normalized text contains no control characters other than `\n`.
//! - Normalized text is never empty: blank input becomes [`PLACEHOLDER`].
//! - Transliterated text is pure ASCII.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Rendered in place of a field that is empty after normalization.
pub const PLACEHOLDER: &str = "-";

/// Normalizes free text before layout.
///
/// `\r\n` and lone `\r` become `\n`, tabs become one space, other control
/// characters below U+0020 are dropped, and surrounding whitespace is trimmed.
pub fn normalize_text(value: &str) -> String {
    let unified = value.replace("\r\n", "\n").replace('\r', "\n");
    let cleaned: String = unified
        .chars()
        .filter_map(|ch| match ch {
            '\n' => Some('\n'),
            '\t' => Some(' '),
            ch if u32::from(ch) < 0x20 => None,
            ch => Some(ch),
        })
        .collect();

    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Reduces text to ASCII for fonts that cannot encode the original.
///
/// Letters lose their diacritics, common typographic punctuation maps to its
/// ASCII counterpart and any other character becomes `?`.
pub fn transliterate_ascii(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.nfkd() {
        if ch.is_ascii() {
            out.push(ch);
            continue;
        }
        if is_combining_mark(ch) {
            continue;
        }
        match ch {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2010}'..='\u{2015}' | '\u{2212}' => out.push('-'),
            '\u{2022}' | '\u{00B7}' => out.push('*'),
            '\u{20AC}' => out.push_str("EUR"),
            '\u{00A3}' => out.push_str("GBP"),
            '\u{00A5}' => out.push_str("JPY"),
            '\u{00DF}' => out.push_str("ss"),
            '\u{00E6}' => out.push_str("ae"),
            '\u{00C6}' => out.push_str("AE"),
            '\u{0153}' => out.push_str("oe"),
            '\u{0152}' => out.push_str("OE"),
            '\u{00F8}' => out.push('o'),
            '\u{00D8}' => out.push('O'),
            '\u{0142}' => out.push('l'),
            '\u{0141}' => out.push('L'),
            '\u{0111}' => out.push('d'),
            '\u{0110}' => out.push('D'),
            _ => out.push('?'),
        }
    }
    out
}
