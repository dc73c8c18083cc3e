use crate::error::FetchError;

/// Port trait wrapping the playlist provider used by the sync driver.
///
/// Implementations live in `services::youtube::client` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PlaylistSource: Send + Sync {
    /// All raw item titles of a playlist, in provider order, across every page.
    async fn playlist_titles(&self, playlist_id: &str) -> Result<Vec<String>, FetchError>;
}
