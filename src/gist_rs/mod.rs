use std::collections::BTreeMap;

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::StoreError;
use crate::ports::document_store::{DocumentUpdate, DocumentUpdates};

/// Docs:
/// https://docs.github.com/en/rest/gists/gists
pub const GITHUB_API_BASE_URL: &str = "https://api.github.com/";

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/* ---------- Read ---------- */

/// Response of `GET /gists/{gist_id}`, reduced to its files.
#[derive(Debug, Clone, Deserialize)]
pub struct Gist {
    #[serde(default)]
    pub files: BTreeMap<String, GistFile>,
}

/// A file inside a gist.
///
/// Notes
/// - `content` is cut off at roughly one megabyte; `truncated` is then set and the full
///   text has to be fetched from `raw_url`.
#[derive(Debug, Clone, Deserialize)]
pub struct GistFile {
    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub truncated: bool,

    #[serde(default)]
    pub raw_url: Option<String>,
}

pub fn gist_url(base_url: &Url, gist_id: &str) -> Result<Url, url::ParseError> {
    base_url.join(&format!("gists/{}", gist_id))
}

pub async fn get_gist(
    client: &Client,
    base_url: &Url,
    gist_id: &str,
    token: &str,
) -> Result<Gist, StoreError> {
    let url = gist_url(base_url, gist_id)?;

    let response = client
        .get(url)
        .header("Accept", GITHUB_ACCEPT)
        .header("Authorization", format!("token {}", token))
        .send()
        .await?;

    let body = ensure_success(response).await?.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// Fetches the full text of a truncated gist file.
pub async fn get_raw_file(client: &Client, raw_url: &str, token: &str) -> Result<String, StoreError> {
    let url = Url::parse(raw_url)?;

    let response = client
        .get(url)
        .header("Authorization", format!("token {}", token))
        .send()
        .await?;

    Ok(ensure_success(response).await?.text().await?)
}

/* ---------- Update ---------- */

/// Body of `PATCH /gists/{gist_id}`. A `null` file deletes it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GistUpdateRequest {
    pub files: BTreeMap<String, Option<GistFileContent>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GistFileContent {
    pub content: String,
}

impl From<&DocumentUpdates> for GistUpdateRequest {
    fn from(updates: &DocumentUpdates) -> Self {
        let files = updates
            .iter()
            .map(|(filename, update)| {
                let file = match update {
                    DocumentUpdate::Write(content) => Some(GistFileContent {
                        content: content.clone(),
                    }),
                    DocumentUpdate::Delete => None,
                };
                (filename.clone(), file)
            })
            .collect();
        Self { files }
    }
}

/// Applies every file change in a single request.
pub async fn update_gist(
    client: &Client,
    base_url: &Url,
    gist_id: &str,
    token: &str,
    request: &GistUpdateRequest,
) -> Result<(), StoreError> {
    let url = gist_url(base_url, gist_id)?;

    let response = client
        .patch(url)
        .header("Accept", GITHUB_ACCEPT)
        .header("Authorization", format!("token {}", token))
        .json(request)
        .send()
        .await?;

    ensure_success(response).await?;
    Ok(())
}

async fn ensure_success(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gist_url() {
        let base = Url::parse(GITHUB_API_BASE_URL).unwrap();
        assert_eq!(
            gist_url(&base, "aa5a315d61ae9438b18d").unwrap().as_str(),
            "https://api.github.com/gists/aa5a315d61ae9438b18d"
        );
    }

    #[test]
    fn test_deserialize_gist() {
        let json = r###"{
            "id": "aa5a315d61ae9438b18d",
            "description": "playlists",
            "files": {
                "Road Trip.md": {
                    "filename": "Road Trip.md",
                    "type": "text/markdown",
                    "size": 40,
                    "truncated": false,
                    "content": "## Playlist: Road Trip\n\n- ✅ One\n"
                },
                "Huge.md": {
                    "filename": "Huge.md",
                    "truncated": true,
                    "raw_url": "https://gist.githubusercontent.com/u/aa5/raw/Huge.md",
                    "content": "## Playlist: Huge\n"
                }
            }
        }"###;
        let gist: Gist = serde_json::from_str(json).unwrap();
        assert_eq!(gist.files.len(), 2);
        let road_trip = &gist.files["Road Trip.md"];
        assert!(!road_trip.truncated);
        assert_eq!(
            road_trip.content.as_deref(),
            Some("## Playlist: Road Trip\n\n- ✅ One\n")
        );
        assert!(gist.files["Huge.md"].truncated);
    }

    #[test]
    fn test_update_request_serializes_deletes_as_null() {
        let mut updates = DocumentUpdates::new();
        updates.insert("A.md".into(), DocumentUpdate::Write("## Playlist: A\n".into()));
        updates.insert("Old.md".into(), DocumentUpdate::Delete);

        let request = GistUpdateRequest::from(&updates);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "files": {
                    "A.md": {"content": "## Playlist: A\n"},
                    "Old.md": null
                }
            })
        );
    }
}
