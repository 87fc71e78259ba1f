use crate::{error::Result, spotify::SpotifyClient, types::SavedTracksResponse};

impl SpotifyClient {
    /// Number of tracks in the user's library. Requests a single item and
    /// reads the page total.
    pub async fn saved_tracks_count(&self) -> Result<u64> {
        let query = [("limit", "1".to_string())];
        let res: SavedTracksResponse = self
            .tokens
            .with_valid_token(|token| self.get_json("/me/tracks", &query, token))
            .await?;

        Ok(res.total)
    }
}
