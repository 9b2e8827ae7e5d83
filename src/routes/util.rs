//! Shared request parsing and JSON response helpers for route handlers.

use serde_json::{Value, json};

use crate::game::session;
use crate::game::store::{Persist, Store};

/// Parse a URL-encoded form body into key-value pairs.
/// Handles `key=value&key2=value2` format.
pub fn parse_form_body(body: &str) -> Vec<(String, String)> {
    if body.is_empty() {
        return Vec::new();
    }
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, val) = pair.split_once('=').unwrap_or((pair, ""));
            (percent_decode(key), percent_decode(val))
        })
        .collect()
}

/// Percent-decode a URL-encoded value. Multi-byte UTF-8 sequences are
/// reassembled; malformed escapes are kept literally.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

/// Parse a query string into key-value pairs.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    let q = query.strip_prefix('?').unwrap_or(query);
    parse_form_body(q)
}

/// Helper to get a value by key from a list of key-value pairs.
pub fn get_param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Strict integer parse: optional sign and digits only. `NaN`, `1.5` and
/// empty input are rejected.
pub fn parse_int(input: &str) -> Option<i64> {
    let s = input.trim();
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Number-input parse: leading integer prefix, anything unparseable reads as 0.
pub fn parse_int_or_zero(input: &str) -> i64 {
    let s = input.trim();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = rest
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end]
        .parse::<i64>()
        .map(|n| sign * n)
        .unwrap_or(0)
}

// ── Responses ──────────────────────────────────────────────────────

pub fn json_error(message: &str) -> String {
    json!({ "error": message }).to_string()
}

/// Serialize a successful response, attaching a non-fatal storage warning.
pub fn respond(persist: &Persist, mut body: Value) -> String {
    if let (Some(warning), Some(map)) = (persist.warning(), body.as_object_mut()) {
        map.insert("warning".to_string(), Value::String(warning.to_string()));
    }
    body.to_string()
}

fn not_booted() -> String {
    json_error("store not booted")
}

/// Read-only access to the session store, or a JSON error before boot.
pub fn read_store(f: impl FnOnce(&Store) -> String) -> String {
    session::with_store(f).unwrap_or_else(not_booted)
}

/// Mutable access to the session store, or a JSON error before boot.
pub fn write_store(f: impl FnOnce(&mut Store) -> String) -> String {
    session::with_store_mut(f).unwrap_or_else(not_booted)
}
