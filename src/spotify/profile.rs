use crate::{
    error::Result,
    spotify::SpotifyClient,
    types::{Profile, UserObject},
};

impl SpotifyClient {
    /// Fetches the current user's profile (`GET /me`).
    pub async fn profile(&self) -> Result<Profile> {
        let user: UserObject = self
            .tokens
            .with_valid_token(|token| self.get_json("/me", &[], token))
            .await?;

        Ok(user.into())
    }
}
