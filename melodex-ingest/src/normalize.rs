//! Key folding and field parsing for raw feed values
//!
//! Every parser here degrades to None/false on malformed input instead of
//! returning an error; a single bad field must never take down a batch.
//! The folded keys are the only identity signal across re-ingests.

use chrono::{Datelike, NaiveDate};
use sha2::{Digest, Sha256};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Trim; blank becomes None
pub fn norm(s: Option<&str>) -> Option<String> {
    let trimmed = s?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Split a comma-joined artist string into trimmed, non-empty names
pub fn split_artists(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Strict `%Y-%m-%d` date; anything else is None
pub fn parse_release_date(s: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s?.trim(), "%Y-%m-%d").ok()
}

/// `mm:ss` to milliseconds
///
/// Exactly one colon, minutes non-negative, seconds in 0..60. Any other
/// shape, including overflow, is None.
pub fn parse_duration_ms(s: Option<&str>) -> Option<i64> {
    let text = norm(s)?;
    let mut parts = text.split(':');
    let minutes_part = parts.next()?;
    let seconds_part = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let minutes: i64 = minutes_part.trim().parse().ok()?;
    let seconds: i64 = seconds_part.trim().parse().ok()?;
    if minutes < 0 || !(0..60).contains(&seconds) {
        return None;
    }
    minutes
        .checked_mul(60)?
        .checked_add(seconds)?
        .checked_mul(1000)
}

/// True iff the value equals "yes" ignoring case; no trimming
pub fn parse_explicit(s: Option<&str>) -> bool {
    s.map(|v| v.eq_ignore_ascii_case("yes")).unwrap_or(false)
}

/// Fold a name into its comparison key
///
/// NFKC-compose, lowercase, strip combining marks via an NFD round trip,
/// recompose, then keep only ASCII alphanumerics and Hangul. The result
/// may be empty (a name of pure punctuation folds to "").
pub fn simplify(s: &str) -> String {
    let lowered = s.nfkc().collect::<String>().to_lowercase();
    lowered
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .nfc()
        .filter(|c| is_key_char(*c))
        .collect()
}

fn is_key_char(c: char) -> bool {
    matches!(c,
        'a'..='z'
        | '0'..='9'
        | '\u{1100}'..='\u{11FF}'   // Hangul Jamo
        | '\u{3130}'..='\u{318F}'   // Hangul Compatibility Jamo
        | '\u{A960}'..='\u{A97F}'   // Hangul Jamo Extended-A
        | '\u{AC00}'..='\u{D7A3}'   // Hangul Syllables
        | '\u{D7B0}'..='\u{D7FF}'   // Hangul Jamo Extended-B
    )
}

/// Identity key for an artist name; None only when the name is blank
pub fn artist_key(name: Option<&str>) -> Option<String> {
    norm(name).map(|n| simplify(&n))
}

/// Identity key for an (album name, release date) pair
///
/// None when the name is blank. A missing date contributes the literal
/// "null" suffix, keeping undated albums distinct from dated ones.
pub fn album_key(name: Option<&str>, date: Option<NaiveDate>) -> Option<String> {
    let name = norm(name)?;
    let date_part = date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "null".to_string());
    Some(format!("{}|{}", simplify(&name), date_part))
}

/// Natural key for a track
///
/// Pipe-joined simplified title, simplified album, ISO date, and the
/// comma-joined sorted artist keys. Sorting makes artist order irrelevant
/// to identity. Missing components become empty strings.
pub fn track_natural_key(
    title: Option<&str>,
    album: Option<&str>,
    date: Option<NaiveDate>,
    artists: &[String],
) -> String {
    let title_part = norm(title).map(|t| simplify(&t)).unwrap_or_default();
    let album_part = norm(album).map(|a| simplify(&a)).unwrap_or_default();
    let date_part = date.map(|d| d.to_string()).unwrap_or_default();

    let mut keys: Vec<String> = artists
        .iter()
        .filter_map(|a| artist_key(Some(a)))
        .collect();
    keys.sort();

    format!(
        "{}|{}|{}|{}",
        title_part,
        album_part,
        date_part,
        keys.join(",")
    )
}

/// 64-char lowercase hex SHA-256 of the key's UTF-8 bytes
pub fn content_hash(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Release year as stored on the album row
pub fn release_year(date: Option<NaiveDate>) -> Option<i64> {
    date.map(|d| i64::from(d.year()))
}
