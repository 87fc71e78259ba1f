use chrono::Local;

use crate::{
    error::Result,
    spotify::{MAX_PAGE_LIMIT, SpotifyClient},
    stats,
    types::{Metric, PlayHistory, Receipt, ReceiptItems, TimeRange, UserStats},
};

/// Artists sampled for the genre breakdown.
const GENRE_SAMPLE_ARTISTS: u32 = 20;

/// Runs one receipt load cycle against the API.
pub struct ReceiptLoader {
    client: SpotifyClient,
}

impl ReceiptLoader {
    pub fn new(client: SpotifyClient) -> Self {
        ReceiptLoader { client }
    }

    pub fn client(&self) -> &SpotifyClient {
        &self.client
    }

    /// Fetches and aggregates the statistics block for `range`.
    ///
    /// The three sub-fetches run concurrently. A session failure in any of
    /// them aborts the load; any other failure degrades that figure to its
    /// default so the rest of the receipt still renders.
    pub async fn load_user_stats(&self, range: TimeRange) -> Result<UserStats> {
        let (liked, recent, artists) = tokio::join!(
            self.client.saved_tracks_count(),
            self.client.recently_played(MAX_PAGE_LIMIT),
            self.client.top_artists(range, GENRE_SAMPLE_ARTISTS),
        );

        let total_liked_songs = or_default(liked, "saved tracks count")?;
        let recent: Vec<PlayHistory> = or_default(recent, "recently played tracks")?;
        let artists = or_default(artists, "top artists")?;

        let played_at: Vec<_> = recent.iter().map(|play| play.played_at).collect();

        Ok(UserStats {
            total_minutes_listened: stats::total_minutes(recent.len(), range),
            favorite_day_time: stats::favorite_day_time(&played_at, range),
            total_liked_songs,
            genre_distribution: stats::genre_distribution(&artists, stats::TOP_GENRES),
        })
    }

    /// Loads everything one receipt needs.
    ///
    /// The profile comes first and its failure is fatal. Stats and the
    /// metric's item list are then fetched concurrently; stats degrade to
    /// defaults on non-session failures, the item list does not.
    pub async fn load(&self, metric: Metric, range: TimeRange, limit: u32) -> Result<Receipt> {
        let profile = self.client.profile().await?;

        let (stats, items) = tokio::join!(
            self.load_user_stats(range),
            self.load_items(metric, range, limit)
        );

        let stats = match stats {
            Ok(stats) => stats,
            Err(e) if e.is_session_failure() => return Err(e),
            Err(e) => {
                log::warn!("failed to load stats: {e}");
                UserStats::default()
            }
        };

        Ok(Receipt {
            profile,
            metric,
            range,
            stats,
            items: items?,
            generated_at: Local::now(),
        })
    }

    async fn load_items(&self, metric: Metric, range: TimeRange, limit: u32) -> Result<ReceiptItems> {
        match metric {
            Metric::TopTracks => Ok(ReceiptItems::Tracks(
                self.client.top_tracks(range, limit).await?,
            )),
            Metric::TopArtists => Ok(ReceiptItems::Artists(
                self.client.top_artists(range, limit).await?,
            )),
            Metric::Stats | Metric::TopGenres => Ok(ReceiptItems::Summary),
        }
    }
}

fn or_default<T: Default>(result: Result<T>, what: &str) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if e.is_session_failure() => Err(e),
        Err(e) => {
            log::warn!("unable to fetch {what}, using default: {e}");
            Ok(T::default())
        }
    }
}
