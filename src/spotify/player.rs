use crate::{
    error::Result,
    spotify::{SpotifyClient, clamp_limit},
    types::{PlayHistory, RecentlyPlayedResponse},
};

impl SpotifyClient {
    /// Recently played tracks, newest first.
    ///
    /// The API never returns more than 50 entries and keeps no deeper
    /// history, which is why listening totals derived from this are estimates.
    pub async fn recently_played(&self, limit: u32) -> Result<Vec<PlayHistory>> {
        let query = [("limit", clamp_limit(limit).to_string())];
        let res: RecentlyPlayedResponse = self
            .tokens
            .with_valid_token(|token| self.get_json("/me/player/recently-played", &query, token))
            .await?;

        Ok(res.items.into_iter().map(PlayHistory::from).collect())
    }
}
