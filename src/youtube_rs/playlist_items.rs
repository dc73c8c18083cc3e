use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::FetchError;

/// Docs:
/// https://developers.google.com/youtube/v3/docs/playlistItems/list
pub const YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

/// Largest page size the playlistItems endpoint accepts.
pub const MAX_RESULTS: u32 = 50;

/* ---------- Response envelope ---------- */

/// One page of `GET /playlistItems?part=snippet`.
///
/// Notes
/// - `nextPageToken` is absent on the last page.
/// - Items of deleted or private videos still carry a snippet title.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItemListResponse {
    #[serde(rename = "nextPageToken", default)]
    pub next_page_token: Option<String>,

    #[serde(default)]
    pub items: Vec<PlaylistItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub snippet: Option<PlaylistItemSnippet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItemSnippet {
    #[serde(default)]
    pub title: Option<String>,
}

impl PlaylistItemListResponse {
    /// Raw titles on this page, skipping items without a snippet title.
    pub fn titles(self) -> impl Iterator<Item = String> {
        self.items
            .into_iter()
            .filter_map(|item| item.snippet.and_then(|snippet| snippet.title))
    }

    /// The token of the following page, if there is one.
    pub fn next_page(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

/* ---------- Requests ---------- */

pub fn playlist_items_url(
    base_url: &Url,
    api_key: &str,
    playlist_id: &str,
    page_token: Option<&str>,
) -> Result<Url, url::ParseError> {
    let mut url = base_url.join("playlistItems")?;
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("part", "snippet")
            .append_pair("maxResults", &MAX_RESULTS.to_string())
            .append_pair("playlistId", playlist_id)
            .append_pair("key", api_key);
        if let Some(token) = page_token {
            query.append_pair("pageToken", token);
        }
    }
    Ok(url)
}

/// Fetches one page of a playlist's items.
///
/// # Errors
/// - `FetchError::Status` with the response body for any non-2xx answer
/// - `FetchError::Decode` when the body is not a playlistItems list
pub async fn get_playlist_items_page(
    client: &Client,
    base_url: &Url,
    api_key: &str,
    playlist_id: &str,
    page_token: Option<&str>,
) -> Result<PlaylistItemListResponse, FetchError> {
    let url = playlist_items_url(base_url, api_key, playlist_id, page_token)?;

    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(FetchError::Status { status, body });
    }

    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playlist_items_url_first_page() {
        let base = Url::parse(YOUTUBE_API_BASE_URL).unwrap();
        let url = playlist_items_url(&base, "secret", "PL123", None).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/youtube/v3/playlistItems?part=snippet&maxResults=50&playlistId=PL123&key=secret"
        );
    }

    #[test]
    fn test_playlist_items_url_with_page_token() {
        let base = Url::parse(YOUTUBE_API_BASE_URL).unwrap();
        let url = playlist_items_url(&base, "k", "PL 1&2", Some("CDIQAA")).unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("playlistId".into(), "PL 1&2".into())));
        assert!(pairs.contains(&("pageToken".into(), "CDIQAA".into())));
    }

    #[test]
    fn test_deserialize_page() {
        let json = r#"{
            "kind": "youtube#playlistItemListResponse",
            "nextPageToken": "CDIQAA",
            "items": [
                {"snippet": {"title": "First Song", "position": 0}},
                {"snippet": {"position": 1}},
                {"id": "no-snippet"},
                {"snippet": {"title": "Private video"}}
            ],
            "pageInfo": {"totalResults": 4, "resultsPerPage": 50}
        }"#;
        let page: PlaylistItemListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(page.next_page(), Some("CDIQAA"));
        let titles: Vec<String> = page.titles().collect();
        assert_eq!(titles, vec!["First Song", "Private video"]);
    }

    #[test]
    fn test_last_page_has_no_token() {
        let page: PlaylistItemListResponse =
            serde_json::from_str(r#"{"items": [], "nextPageToken": ""}"#).unwrap();
        assert_eq!(page.next_page(), None);

        let page: PlaylistItemListResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(page.next_page(), None);
        assert_eq!(page.titles().count(), 0);
    }
}
