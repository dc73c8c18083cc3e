use std::collections::BTreeMap;

use backon::Retryable;
use reqwest::Client;
use url::Url;

use crate::error::StoreError;
use crate::gist_rs::{
    GITHUB_API_BASE_URL, GistFile, GistUpdateRequest, get_gist, get_raw_file, update_gist,
};
use crate::ports::document_store::{DocumentStore, DocumentUpdates, Documents};
use crate::services::http::HttpOptions;

pub struct GistHttpAdapter {
    client: Client,
    base_url: Url,
    gist_id: String,
    token: String,
    options: HttpOptions,
}

impl GistHttpAdapter {
    pub fn new(gist_id: String, token: String, options: HttpOptions) -> Result<Self, StoreError> {
        Ok(Self {
            client: options.build_client()?,
            base_url: Url::parse(GITHUB_API_BASE_URL)?,
            gist_id,
            token,
            options,
        })
    }
}

#[async_trait::async_trait]
impl DocumentStore for GistHttpAdapter {
    async fn fetch_documents(&self) -> Result<Documents, StoreError> {
        let client = &self.client;
        let base_url = &self.base_url;
        let gist_id = self.gist_id.as_str();
        let token = self.token.as_str();

        let gist = (move || async move { get_gist(client, base_url, gist_id, token).await })
            .retry(self.options.backoff())
            .when(StoreError::is_transient)
            .notify(|err, delay| log::warn!("Retrying gist read in {:?}: {}", delay, err))
            .await?;

        let options = &self.options;
        let documents = resolve_documents(gist.files, move |raw_url| async move {
            let url = raw_url.as_str();
            (move || async move { get_raw_file(client, url, token).await })
                .retry(options.backoff())
                .when(StoreError::is_transient)
                .notify(|err, delay| {
                    log::warn!("Retrying raw read of {} in {:?}: {}", url, delay, err)
                })
                .await
        })
        .await?;

        log::debug!("Gist {} holds {} files", gist_id, documents.len());
        Ok(documents)
    }

    async fn apply_updates(&self, updates: DocumentUpdates) -> Result<(), StoreError> {
        let client = &self.client;
        let base_url = &self.base_url;
        let gist_id = self.gist_id.as_str();
        let token = self.token.as_str();
        let request = GistUpdateRequest::from(&updates);
        let request = &request;

        (move || async move { update_gist(client, base_url, gist_id, token, request).await })
            .retry(self.options.backoff())
            .when(StoreError::is_transient)
            .notify(|err, delay| log::warn!("Retrying gist update in {:?}: {}", delay, err))
            .await?;

        log::debug!("Updated {} files in gist {}", updates.len(), gist_id);
        Ok(())
    }
}

/// Turns gist files into documents. Truncated files are loaded in full through
/// `fetch_raw`, which gets the file's `raw_url`.
pub(crate) async fn resolve_documents<F, Fut>(
    files: BTreeMap<String, GistFile>,
    mut fetch_raw: F,
) -> Result<Documents, StoreError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<String, StoreError>>,
{
    let mut documents = Documents::new();
    for (filename, file) in files {
        let content = match (file.truncated, file.raw_url) {
            (true, Some(raw_url)) => {
                log::debug!("Fetching truncated gist file {} from {}", filename, raw_url);
                fetch_raw(raw_url).await?
            }
            _ => file.content.unwrap_or_default(),
        };
        documents.insert(filename, content);
    }
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(content: Option<&str>, truncated: bool, raw_url: Option<&str>) -> GistFile {
        GistFile {
            content: content.map(str::to_owned),
            truncated,
            raw_url: raw_url.map(str::to_owned),
        }
    }

    #[tokio::test]
    async fn test_truncated_file_is_fetched_from_raw_url() {
        let mut files = BTreeMap::new();
        files.insert(
            "Huge.md".to_string(),
            file(
                Some("## Playlist: Huge\n"),
                true,
                Some("https://gist.githubusercontent.com/u/aa5/raw/Huge.md"),
            ),
        );
        files.insert(
            "Small.md".to_string(),
            file(
                Some("## Playlist: Small\n\n- ✅ A\n"),
                false,
                Some("https://gist.githubusercontent.com/u/aa5/raw/Small.md"),
            ),
        );

        let mut fetched = Vec::new();
        let documents = resolve_documents(files, |raw_url| {
            fetched.push(raw_url);
            async { Ok::<_, StoreError>("## Playlist: Huge\n\n- ✅ Full\n".to_string()) }
        })
        .await
        .unwrap();

        assert_eq!(
            fetched,
            vec!["https://gist.githubusercontent.com/u/aa5/raw/Huge.md".to_string()]
        );
        assert_eq!(documents["Huge.md"], "## Playlist: Huge\n\n- ✅ Full\n");
        assert_eq!(documents["Small.md"], "## Playlist: Small\n\n- ✅ A\n");
    }

    #[tokio::test]
    async fn test_missing_content_is_empty_document() {
        let mut files = BTreeMap::new();
        files.insert("Blank.md".to_string(), file(None, false, None));
        files.insert("Cut.md".to_string(), file(Some("partial"), true, None));

        let documents = resolve_documents(files, |_| async {
            Err::<String, _>(StoreError::Status {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                body: String::new(),
            })
        })
        .await
        .unwrap();

        assert_eq!(documents["Blank.md"], "");
        assert_eq!(documents["Cut.md"], "partial");
    }

    #[tokio::test]
    async fn test_raw_fetch_error_propagates() {
        let mut files = BTreeMap::new();
        files.insert(
            "Huge.md".to_string(),
            file(None, true, Some("https://gist.githubusercontent.com/u/aa5/raw/Huge.md")),
        );

        let result = resolve_documents(files, |_| async {
            Err::<String, _>(StoreError::Status {
                status: reqwest::StatusCode::NOT_FOUND,
                body: "Not Found".into(),
            })
        })
        .await;

        assert!(matches!(
            result,
            Err(StoreError::Status { status, .. }) if status == reqwest::StatusCode::NOT_FOUND
        ));
    }
}
