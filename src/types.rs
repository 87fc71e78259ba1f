use std::fmt;

use chrono::{DateTime, Local, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::error::{Error, Result};

/// Label shown wherever a favorite listening period cannot be derived.
pub const NOT_AVAILABLE: &str = "Not available";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at_ms: i64,
}

impl Credential {
    /// Builds a credential from a token response received at `now_ms`.
    ///
    /// When the response carries no refresh token the `fallback_refresh`
    /// one is kept, which is how the refresh grant is allowed to omit it.
    /// An `expires_in` that does not fit an epoch-millisecond timestamp is
    /// reported as [`Error::MalformedResponse`].
    pub fn issue(
        response: &TokenResponse,
        now_ms: i64,
        fallback_refresh: Option<String>,
    ) -> Result<Self> {
        let expires_at_ms = i64::try_from(response.expires_in)
            .ok()
            .and_then(|secs| secs.checked_mul(1000))
            .and_then(|ms| now_ms.checked_add(ms))
            .ok_or_else(|| {
                Error::MalformedResponse(format!(
                    "token lifetime out of range: expires_in={}",
                    response.expires_in
                ))
            })?;

        Ok(Credential {
            access_token: response.access_token.clone().unwrap_or_default(),
            refresh_token: response.refresh_token.clone().or(fallback_refresh),
            expires_at_ms,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
    pub token_type: Option<String>,
    pub scope: Option<String>,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenErrorResponse {
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    /// Roughly the last 4 weeks
    ShortTerm,
    /// Roughly the last 6 months
    MediumTerm,
    /// All time
    LongTerm,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::ShortTerm => "short_term",
            TimeRange::MediumTerm => "medium_term",
            TimeRange::LongTerm => "long_term",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::ShortTerm => "Last Month",
            TimeRange::MediumTerm => "Last 6 Months",
            TimeRange::LongTerm => "All Time",
        }
    }

    /// Scaling factor applied to sample-based estimates for this range.
    pub fn multiplier(&self) -> u64 {
        match self {
            TimeRange::ShortTerm => 1,
            TimeRange::MediumTerm => 6,
            TimeRange::LongTerm => 12,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    TopTracks,
    TopArtists,
    Stats,
    TopGenres,
}

impl Metric {
    pub fn title(&self) -> &'static str {
        match self {
            Metric::TopTracks => "Your Top Tracks",
            Metric::TopArtists => "Your Top Artists",
            Metric::Stats => "Your Stats",
            Metric::TopGenres => "Your Top Genres",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayTime {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl DayTime {
    pub const ALL: [DayTime; 4] = [
        DayTime::Morning,
        DayTime::Afternoon,
        DayTime::Evening,
        DayTime::Night,
    ];

    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => DayTime::Morning,
            12..=16 => DayTime::Afternoon,
            17..=21 => DayTime::Evening,
            _ => DayTime::Night,
        }
    }

    pub(crate) fn slot(&self) -> usize {
        match self {
            DayTime::Morning => 0,
            DayTime::Afternoon => 1,
            DayTime::Evening => 2,
            DayTime::Night => 3,
        }
    }
}

impl fmt::Display for DayTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DayTime::Morning => "Morning",
            DayTime::Afternoon => "Afternoon",
            DayTime::Evening => "Evening",
            DayTime::Night => "Night",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artist_names: Vec<String>,
    pub duration_ms: u64,
    pub uri: String,
    pub album_image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub genres: Vec<String>,
    pub follower_count: u64,
    pub image_url: Option<String>,
    pub external_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayHistory {
    pub track: Track,
    pub played_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub display_name: Option<String>,
    pub product: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreShare {
    pub name: String,
    pub percentage: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    /// Estimated from the recently-played sample, see [`crate::stats::total_minutes`].
    pub total_minutes_listened: u64,
    pub favorite_day_time: Option<DayTime>,
    pub total_liked_songs: u64,
    pub genre_distribution: Vec<GenreShare>,
}

impl UserStats {
    pub fn favorite_day_time_label(&self) -> String {
        self.favorite_day_time
            .map(|d| d.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum ReceiptItems {
    Tracks(Vec<Track>),
    Artists(Vec<Artist>),
    Summary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub profile: Profile,
    pub metric: Metric,
    pub range: TimeRange,
    pub stats: UserStats,
    pub items: ReceiptItems,
    pub generated_at: DateTime<Local>,
}

// Raw Spotify Web API payloads.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Followers {
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifiedArtist {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumObject {
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackObject {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SimplifiedArtist>,
    pub duration_ms: u64,
    pub uri: String,
    pub album: Option<AlbumObject>,
}

impl From<TrackObject> for Track {
    fn from(raw: TrackObject) -> Self {
        Track {
            id: raw.id.unwrap_or_default(),
            name: raw.name,
            artist_names: raw.artists.into_iter().map(|a| a.name).collect(),
            duration_ms: raw.duration_ms,
            uri: raw.uri,
            album_image_url: raw
                .album
                .and_then(|album| album.images.into_iter().next())
                .map(|image| image.url),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistObject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    pub followers: Option<Followers>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub external_urls: Option<ExternalUrls>,
}

impl From<ArtistObject> for Artist {
    fn from(raw: ArtistObject) -> Self {
        Artist {
            id: raw.id,
            name: raw.name,
            genres: raw.genres,
            follower_count: raw.followers.and_then(|f| f.total).unwrap_or(0),
            image_url: raw.images.into_iter().next().map(|image| image.url),
            external_url: raw
                .external_urls
                .and_then(|urls| urls.spotify)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserObject {
    pub id: String,
    pub display_name: Option<String>,
    pub product: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
}

impl From<UserObject> for Profile {
    fn from(raw: UserObject) -> Self {
        Profile {
            id: raw.id,
            display_name: raw.display_name,
            product: raw.product,
            image_url: raw.images.into_iter().next().map(|image| image.url),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<T>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayHistoryObject {
    pub track: TrackObject,
    pub played_at: DateTime<Utc>,
}

impl From<PlayHistoryObject> for PlayHistory {
    fn from(raw: PlayHistoryObject) -> Self {
        PlayHistory {
            track: raw.track.into(),
            played_at: raw.played_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentlyPlayedResponse {
    pub items: Vec<PlayHistoryObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTracksResponse {
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistResponse {
    pub snapshot_id: String,
}

// Receipt table rows.

#[derive(Tabled)]
pub struct TrackReceiptRow {
    #[tabled(rename = "QTY")]
    pub qty: String,
    #[tabled(rename = "ITEM")]
    pub item: String,
    #[tabled(rename = "AMT")]
    pub amount: String,
}

#[derive(Tabled)]
pub struct ArtistReceiptRow {
    #[tabled(rename = "QTY")]
    pub qty: String,
    #[tabled(rename = "ARTIST")]
    pub name: String,
    #[tabled(rename = "GENRES")]
    pub genres: String,
    #[tabled(rename = "FOLLOWERS")]
    pub followers: String,
}

#[derive(Tabled)]
pub struct StatReceiptRow {
    #[tabled(rename = "ITEM")]
    pub label: String,
    #[tabled(rename = "VALUE")]
    pub value: String,
}
