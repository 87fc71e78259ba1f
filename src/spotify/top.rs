use crate::{
    error::Result,
    spotify::{SpotifyClient, clamp_limit},
    types::{Artist, ArtistObject, Paging, TimeRange, Track, TrackObject},
};

impl SpotifyClient {
    /// The user's most played tracks over `range`, at most 50.
    pub async fn top_tracks(&self, range: TimeRange, limit: u32) -> Result<Vec<Track>> {
        let query = top_query(range, limit);
        let page: Paging<TrackObject> = self
            .tokens
            .with_valid_token(|token| self.get_json("/me/top/tracks", &query, token))
            .await?;

        Ok(page.items.into_iter().map(Track::from).collect())
    }

    /// The user's most played artists over `range`, at most 50.
    pub async fn top_artists(&self, range: TimeRange, limit: u32) -> Result<Vec<Artist>> {
        let query = top_query(range, limit);
        let page: Paging<ArtistObject> = self
            .tokens
            .with_valid_token(|token| self.get_json("/me/top/artists", &query, token))
            .await?;

        Ok(page.items.into_iter().map(Artist::from).collect())
    }
}

fn top_query(range: TimeRange, limit: u32) -> [(&'static str, String); 2] {
    [
        ("time_range", range.as_str().to_string()),
        ("limit", clamp_limit(limit).to_string()),
    ]
}
