//! Text measurement and greedy word wrapping.

/// Line advance as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// Font families the renderer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    /// System UI sans-serif, used for text blocks.
    Text,
    /// Color emoji font, used for stickers.
    Emoji,
}

impl FontFamily {
    /// CSS font-family list for this family.
    #[must_use]
    pub const fn css(self) -> &'static str {
        match self {
            Self::Text => "system-ui, sans-serif",
            Self::Emoji => "Segoe UI Emoji, Apple Color Emoji, Noto Color Emoji, sans-serif",
        }
    }
}

/// Estimate the advance of `text` without font data.
///
/// Uses per-class average advances of common sans-serif faces; emoji and
/// CJK glyphs count as one em.
#[must_use]
pub fn approximate_width(text: &str, font_size: f64) -> f64 {
    text.chars().map(approximate_advance).sum::<f64>() * font_size
}

fn approximate_advance(c: char) -> f64 {
    match c {
        ' ' => 0.28,
        'i' | 'j' | 'l' | '.' | ',' | '\'' | '!' | '|' | ':' | ';' => 0.26,
        'm' | 'w' | 'M' | 'W' => 0.82,
        c if c.is_ascii_uppercase() || c.is_ascii_digit() => 0.62,
        c if c.is_ascii() => 0.52,
        c if u32::from(c) >= 0x2E80 => 1.0,
        _ => 0.56,
    }
}

/// Break `text` into lines no wider than `max_width`.
///
/// Words (split on single spaces) are appended greedily; a word that would
/// push the line past `max_width` starts a new line unless it is the first
/// word. The final line is always emitted, so empty text yields one empty
/// line.
pub fn wrap_text<F>(text: &str, max_width: f64, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let mut lines = Vec::new();
    let mut line = String::new();

    for (n, word) in text.split(' ').enumerate() {
        let candidate = format!("{line}{word} ");
        if measure(&candidate) > max_width && n > 0 {
            lines.push(line.trim_end_matches(' ').to_string());
            line = format!("{word} ");
        } else {
            line = candidate;
        }
    }
    lines.push(line.trim_end_matches(' ').to_string());
    lines
}
