use crate::{
    cli::{receipt::with_spinner, report_failure, session},
    info, success,
    types::TimeRange,
};

/// Creates a private playlist from the user's top tracks over `range`.
pub async fn playlist(range: TimeRange, limit: u32, name: Option<String>) {
    let client = session::client();

    let loaded = with_spinner("Fetching your top tracks...", async {
        let profile = client.profile().await?;
        let tracks = client.top_tracks(range, limit).await?;
        Ok::<_, crate::error::Error>((profile, tracks))
    })
    .await;

    let (profile, tracks) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => report_failure(&e),
    };

    if tracks.is_empty() {
        info!("No top tracks for {}, nothing to add.", range.label());
        return;
    }

    let owner = profile.display_name.clone().unwrap_or_default();
    let uris: Vec<String> = tracks.iter().map(|t| t.uri.clone()).collect();

    info!("Creating playlist with {} tracks...", uris.len());
    match client.create_playlist(&owner, &uris, name.as_deref()).await {
        Ok(id) => {
            success!("Playlist created successfully!");
            info!("https://open.spotify.com/playlist/{}", id);
        }
        Err(e) => report_failure(&e),
    }
}
