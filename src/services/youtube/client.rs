use backon::Retryable;
use reqwest::Client;
use url::Url;

use crate::error::FetchError;
use crate::ports::playlist_source::PlaylistSource;
use crate::services::http::HttpOptions;
use crate::youtube_rs::playlist_items::PlaylistItemListResponse;
use crate::youtube_rs::{YOUTUBE_API_BASE_URL, get_playlist_items_page};

pub struct YoutubeHttpAdapter {
    client: Client,
    base_url: Url,
    api_key: String,
    options: HttpOptions,
}

impl YoutubeHttpAdapter {
    pub fn new(api_key: String, options: HttpOptions) -> Result<Self, FetchError> {
        Ok(Self {
            client: options.build_client()?,
            base_url: Url::parse(YOUTUBE_API_BASE_URL)?,
            api_key,
            options,
        })
    }
}

#[async_trait::async_trait]
impl PlaylistSource for YoutubeHttpAdapter {
    async fn playlist_titles(&self, playlist_id: &str) -> Result<Vec<String>, FetchError> {
        let client = &self.client;
        let base_url = &self.base_url;
        let api_key = self.api_key.as_str();
        let options = &self.options;

        collect_titles(playlist_id, move |page_token| async move {
            let token = page_token.as_deref();
            (move || async move {
                get_playlist_items_page(client, base_url, api_key, playlist_id, token).await
            })
            .retry(options.backoff())
            .when(FetchError::is_transient)
            .notify(|err, delay| {
                log::warn!("Retrying playlist {} page in {:?}: {}", playlist_id, delay, err)
            })
            .await
        })
        .await
    }
}

/// Requests pages through `fetch_page` until the last one and collects their titles.
///
/// `fetch_page` gets the token of the page to load, `None` for the first one. Paging
/// stops on a missing or empty `nextPageToken`, or when a page hands back the token it
/// was requested with.
pub(crate) async fn collect_titles<F, Fut>(
    playlist_id: &str,
    mut fetch_page: F,
) -> Result<Vec<String>, FetchError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<PlaylistItemListResponse, FetchError>>,
{
    let mut titles = Vec::new();
    let mut page_token: Option<String> = None;
    let mut pages = 0;

    loop {
        let page = fetch_page(page_token.clone()).await?;
        pages += 1;

        let next = page.next_page().map(str::to_owned);
        titles.extend(page.titles());

        match next {
            // A repeated token would page forever.
            Some(next) if page_token.as_deref() != Some(next.as_str()) => page_token = Some(next),
            Some(next) => {
                log::warn!(
                    "Playlist {} repeated page token {}, stopping after {} pages",
                    playlist_id,
                    next,
                    pages
                );
                break;
            }
            None => break,
        }
    }

    log::debug!(
        "Fetched {} titles in {} pages for playlist {}",
        titles.len(),
        pages,
        playlist_id
    );
    Ok(titles)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    fn page(titles: &[&str], next: Option<&str>) -> PlaylistItemListResponse {
        let items: Vec<serde_json::Value> = titles
            .iter()
            .map(|title| serde_json::json!({ "snippet": { "title": title } }))
            .collect();
        serde_json::from_value(serde_json::json!({
            "nextPageToken": next,
            "items": items,
        }))
        .unwrap()
    }

    /// Serves canned pages in order and records the token of every request.
    async fn collect_from(
        pages: Vec<PlaylistItemListResponse>,
    ) -> (Result<Vec<String>, FetchError>, Vec<Option<String>>) {
        let mut pages = VecDeque::from(pages);
        let mut requested = Vec::new();
        let result = collect_titles("PL1", |token| {
            requested.push(token);
            let page = pages.pop_front().expect("no page left to serve");
            async move { Ok::<_, FetchError>(page) }
        })
        .await;
        (result, requested)
    }

    #[tokio::test]
    async fn test_collects_titles_across_pages() {
        let (result, requested) = collect_from(vec![
            page(&["One", "Two"], Some("p2")),
            page(&["Three"], Some("p3")),
            page(&["Four"], None),
        ])
        .await;

        assert_eq!(result.unwrap(), vec!["One", "Two", "Three", "Four"]);
        assert_eq!(
            requested,
            vec![None, Some("p2".to_string()), Some("p3".to_string())]
        );
    }

    #[tokio::test]
    async fn test_empty_token_ends_paging() {
        let (result, requested) =
            collect_from(vec![page(&["One"], Some("p2")), page(&["Two"], Some(""))]).await;

        assert_eq!(result.unwrap(), vec!["One", "Two"]);
        assert_eq!(requested.len(), 2);
    }

    #[tokio::test]
    async fn test_repeated_token_ends_paging() {
        let (result, requested) = collect_from(vec![
            page(&["One"], Some("p2")),
            page(&["Two"], Some("p2")),
            page(&["Never"], None),
        ])
        .await;

        assert_eq!(result.unwrap(), vec!["One", "Two"]);
        assert_eq!(requested, vec![None, Some("p2".to_string())]);
    }

    #[tokio::test]
    async fn test_page_error_propagates() {
        let mut calls = 0;
        let result = collect_titles("PL1", |token| {
            calls += 1;
            async move {
                match token {
                    None => Ok(page(&["One"], Some("p2"))),
                    Some(_) => Err(FetchError::Status {
                        status: reqwest::StatusCode::NOT_FOUND,
                        body: "playlistNotFound".into(),
                    }),
                }
            }
        })
        .await;

        assert!(matches!(
            result,
            Err(FetchError::Status { status, .. }) if status == reqwest::StatusCode::NOT_FOUND
        ));
        assert_eq!(calls, 2);
    }
}
