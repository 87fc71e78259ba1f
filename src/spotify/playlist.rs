use crate::{
    error::Result,
    spotify::SpotifyClient,
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest,
        CreatePlaylistResponse,
    },
};

/// The API accepts at most this many URIs per add-tracks request.
const ADD_TRACKS_CHUNK: usize = 100;

pub const PLAYLIST_DESCRIPTION: &str = "Created with Receiptify";

/// Name used when the caller does not pick one.
pub fn default_playlist_name(owner_name: &str) -> String {
    let owner = owner_name.trim();
    if owner.is_empty() {
        "My Top Tracks".to_string()
    } else {
        format!("{owner}'s Top Tracks")
    }
}

impl SpotifyClient {
    /// Creates a private playlist for the current user and fills it with
    /// `track_uris`. Returns the new playlist's id.
    ///
    /// The user id is looked up through [`SpotifyClient::profile`];
    /// `owner_name` only feeds the default playlist name.
    pub async fn create_playlist(
        &self,
        owner_name: &str,
        track_uris: &[String],
        name: Option<&str>,
    ) -> Result<String> {
        let profile = self.profile().await?;
        let request = CreatePlaylistRequest {
            name: name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| default_playlist_name(owner_name)),
            description: PLAYLIST_DESCRIPTION.to_string(),
            public: false,
        };

        let path = format!("/users/{}/playlists", profile.id);
        let created: CreatePlaylistResponse = self
            .tokens
            .with_valid_token(|token| self.post_json(&path, &request, token))
            .await?;
        log::debug!("created playlist {} ({})", created.name, created.id);

        if !track_uris.is_empty() {
            self.add_tracks_to_playlist(&created.id, track_uris).await?;
        }

        Ok(created.id)
    }

    /// Appends `track_uris` to a playlist, in chunks the API accepts.
    pub async fn add_tracks_to_playlist(
        &self,
        playlist_id: &str,
        track_uris: &[String],
    ) -> Result<()> {
        let path = format!("/playlists/{playlist_id}/tracks");

        for chunk in track_uris.chunks(ADD_TRACKS_CHUNK) {
            let request = AddTrackToPlaylistRequest {
                uris: chunk.to_vec(),
            };
            let _: AddTrackToPlaylistResponse = self
                .tokens
                .with_valid_token(|token| self.post_json(&path, &request, token))
                .await?;
        }

        Ok(())
    }
}
