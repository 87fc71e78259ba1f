use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, TimeZone};
use rand::{Rng, distr::Alphanumeric};

use crate::types::Track;

/// Random value for the OAuth `state` parameter.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// `Basic base64(client_id:client_secret)` for the token endpoint.
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{client_id}:{client_secret}"))
    )
}

/// Formats a track length as `m:ss`.
pub fn format_duration(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    format!("{minutes}:{seconds:02}")
}

/// Formats a minute count as `Xh Ym`.
pub fn format_listening_time(minutes: u64) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Sum of the displayed (whole-second) track lengths, as `m:ss`.
pub fn total_duration(tracks: &[Track]) -> String {
    let total_seconds: u64 = tracks.iter().map(|t| t.duration_ms / 1000).sum();
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Receipt timestamp, e.g. `10/16/2026, 5:42 PM`.
pub fn format_receipt_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%-m/%-d/%Y, %-I:%M %p").to_string()
}

/// Groups digits in thousands, e.g. `1234567` → `1,234,567`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
