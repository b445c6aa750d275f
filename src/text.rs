//! Text normalization applied to raw user input before it reaches a
//! [`RenderInput`](crate::RenderInput).

/// Longest quote accepted from the form, in characters.
pub const MAX_QUOTE_CHARS: usize = 400;

/// Longest author name accepted from the form, in characters.
pub const MAX_AUTHOR_CHARS: usize = 50;

/// Fraction of Latin letters above which text counts as Latin script.
pub const LATIN_RATIO_THRESHOLD: f32 = 0.6;

/// Collapses whitespace runs to a single space and trims the ends.
pub fn normalize_spaces(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns true if more than 60% of the non-whitespace characters are
/// ASCII letters. Exactly 60% is not Latin. Blank text counts as Latin.
pub fn is_latin_text(text: &str) -> bool {
    let (latin, total) = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .fold((0usize, 0usize), |(latin, total), c| {
            (latin + c.is_ascii_alphabetic() as usize, total + 1)
        });
    if total == 0 {
        return true;
    }
    latin as f32 / total as f32 > LATIN_RATIO_THRESHOLD
}

/// Wraps text in curly double quotes unless it is already wrapped.
///
/// Already wrapped text has straight outer quotes upgraded; unwrapped text
/// has inner straight quotes turned into closing curly quotes.
pub fn to_curly_quotes(s: &str) -> String {
    let t = s.trim();
    let wrapped = (t.starts_with('\u{201C}') && t.ends_with('\u{201D}'))
        || (t.starts_with('"') && t.ends_with('"'))
        || (t.starts_with('\u{201D}') && t.ends_with('\u{201C}'));

    if wrapped {
        let opened = match t.strip_prefix('"') {
            Some(rest) => format!("\u{201C}{rest}"),
            None => t.to_string(),
        };
        return match opened.strip_suffix('"') {
            Some(rest) => format!("{rest}\u{201D}"),
            None => opened,
        };
    }
    format!("\u{201C}{}\u{201D}", t.replace('"', "\u{201D}"))
}

/// Prefixes a non-empty author with an em dash.
pub fn format_author(author: &str) -> String {
    let t = normalize_spaces(author);
    if t.is_empty() {
        return String::new();
    }
    format!("\u{2014} {t}")
}

/// Full quote normalization: length cap, whitespace collapse and curly
/// quotes for Latin text.
pub fn normalize_quote(raw: &str) -> String {
    let capped: String = raw.chars().take(MAX_QUOTE_CHARS).collect();
    let t = normalize_spaces(&capped);
    if is_latin_text(&t) { to_curly_quotes(&t) } else { t }
}

/// Full author normalization: length cap, whitespace collapse and dash
/// prefix for every script.
pub fn normalize_author(raw: &str) -> String {
    let capped: String = raw.chars().take(MAX_AUTHOR_CHARS).collect();
    format_author(&capped)
}
