//! Magnet links: built from `.torrent` files, or scraped from web pages.

use std::sync::LazyLock;

use regex::Regex;
use sha1::{Digest, Sha1};

use crate::domain::error::MagnetError;

/// Prefix every magnet link starts with.
pub const MAGNET_PREFIX: &str = "magnet:?";

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r#"href=["'](.*?)["']"#).expect("valid regex")
});

/// Whether `text` contains a magnet link anywhere.
#[must_use]
pub fn contains_magnet(text: &str) -> bool {
    text.contains(MAGNET_PREFIX)
}

/// All `href` targets of an HTML page that are magnet links, in page order.
#[must_use]
pub fn extract_magnet_links(html: &str) -> Vec<String> {
    HREF_RE
        .captures_iter(html)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|link| link.starts_with(MAGNET_PREFIX))
        .map(str::to_string)
        .collect()
}

/// SHA-1 of the raw bencoded `info` dictionary of a `.torrent` file.
///
/// # Errors
///
/// Returns an error if the data is not a well-formed bencoded dictionary
/// with an `info` key.
pub fn info_hash(torrent: &[u8]) -> Result<[u8; 20], MagnetError> {
    let (start, end) = info_span(torrent)?;
    let digest = Sha1::digest(&torrent[start..end]);
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&digest);
    Ok(hash)
}

/// Magnet link (`xt=urn:btih:<hex>`) for a `.torrent` file.
///
/// # Errors
///
/// Returns an error if the info hash cannot be computed.
pub fn magnet_from_torrent(torrent: &[u8]) -> Result<String, MagnetError> {
    let hash = info_hash(torrent)?;
    Ok(format!("{MAGNET_PREFIX}xt=urn:btih:{}", hex::encode(hash)))
}

/// Byte range of the value stored under the top-level `info` key.
fn info_span(data: &[u8]) -> Result<(usize, usize), MagnetError> {
    if data.first() != Some(&b'd') {
        return Err(MagnetError::NotADictionary);
    }
    let mut pos = 1;
    let mut span = None;
    loop {
        match data.get(pos) {
            None => return Err(MagnetError::UnexpectedEof),
            Some(b'e') => {
                pos += 1;
                break;
            }
            Some(_) => {}
        }
        let (key_start, key_end) = string_span(data, pos)?;
        let value_end = skip_value(data, key_end)?;
        if &data[key_start..key_end] == b"info" {
            span = Some((key_end, value_end));
        }
        pos = value_end;
    }
    if pos != data.len() {
        return Err(MagnetError::TrailingData);
    }
    span.ok_or(MagnetError::MissingInfo)
}

/// Position just past the bencoded value starting at `pos`.
///
/// Lists and dictionaries are walked with a nesting counter, so input depth
/// never grows the call stack.
fn skip_value(data: &[u8], pos: usize) -> Result<usize, MagnetError> {
    let mut depth = 0usize;
    let mut i = pos;
    loop {
        i = match data.get(i) {
            None => return Err(MagnetError::UnexpectedEof),
            Some(b'e') if depth > 0 => {
                depth -= 1;
                i + 1
            }
            Some(b'l' | b'd') => {
                depth += 1;
                i + 1
            }
            Some(b'i') => skip_int(data, i)?,
            Some(b'0'..=b'9') => string_span(data, i)?.1,
            Some(&other) => return Err(MagnetError::InvalidPrefix(other, i)),
        };
        if depth == 0 {
            return Ok(i);
        }
    }
}

/// Position just past the integer `i<digits>e` starting at `pos`.
fn skip_int(data: &[u8], pos: usize) -> Result<usize, MagnetError> {
    let end = find(data, pos + 1, b'e')?;
    let digits = &data[pos + 1..end];
    let valid = match digits {
        [] | [b'-'] => false,
        [b'-', rest @ ..] => rest.iter().all(u8::is_ascii_digit) && rest[0] != b'0',
        [b'0', _, ..] => false,
        _ => digits.iter().all(u8::is_ascii_digit),
    };
    if !valid {
        return Err(MagnetError::InvalidInt(pos));
    }
    Ok(end + 1)
}

/// Payload range of the byte string starting at `pos` (`<len>:<bytes>`).
fn string_span(data: &[u8], pos: usize) -> Result<(usize, usize), MagnetError> {
    let colon = find(data, pos, b':')?;
    let len: usize = std::str::from_utf8(&data[pos..colon])
        .ok()
        .filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|s| s.parse().ok())
        .ok_or(MagnetError::InvalidLen(pos))?;
    let start = colon + 1;
    let end = start.checked_add(len).ok_or(MagnetError::InvalidLen(pos))?;
    if end > data.len() {
        return Err(MagnetError::UnexpectedEof);
    }
    Ok((start, end))
}

fn find(data: &[u8], from: usize, needle: u8) -> Result<usize, MagnetError> {
    data.get(from..)
        .and_then(|rest| rest.iter().position(|&b| b == needle))
        .map(|offset| from + offset)
        .ok_or(MagnetError::UnexpectedEof)
}
