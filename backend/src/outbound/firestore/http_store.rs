//! Reqwest-backed Firestore REST adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::{DocumentDto, ListDocumentsDto, encode_document};
use crate::domain::ports::{DocumentStore, DocumentStoreError};
use crate::domain::{CollectionPath, Document, DocumentPath, Fields};

/// Public Firestore endpoint.
pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/";

const LIST_PAGE_SIZE: &str = "300";

/// Connection settings for [`FirestoreHttpStore`].
#[derive(Debug, Clone)]
pub struct FirestoreSettings {
    /// API root, e.g. [`DEFAULT_FIRESTORE_URL`] or an emulator address.
    pub base_url: Url,
    /// Google Cloud project id.
    pub project_id: String,
    /// Optional OAuth bearer token; the emulator accepts none.
    pub bearer_token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Errors raised while building the adapter.
#[derive(Debug, thiserror::Error)]
pub enum FirestoreSetupError {
    /// The HTTP client could not be built.
    #[error("failed to build Firestore HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    /// The base URL and project id do not form a usable documents URL.
    #[error("invalid Firestore documents URL: {0}")]
    Url(String),
}

/// [`DocumentStore`] backed by the Firestore REST API.
pub struct FirestoreHttpStore {
    client: Client,
    documents_url: Url,
    bearer_token: Option<Zeroizing<String>>,
}

impl FirestoreHttpStore {
    /// Build the adapter.
    ///
    /// # Errors
    ///
    /// Returns [`FirestoreSetupError`] when the client cannot be constructed
    /// or the documents URL is malformed.
    pub fn new(settings: FirestoreSettings) -> Result<Self, FirestoreSetupError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        let mut documents_url = settings.base_url;
        documents_url
            .path_segments_mut()
            .map_err(|()| FirestoreSetupError::Url("base URL cannot have a path".to_owned()))?
            .pop_if_empty()
            .extend([
                "v1",
                "projects",
                settings.project_id.as_str(),
                "databases",
                "(default)",
                "documents",
            ]);
        Ok(Self {
            client,
            documents_url,
            bearer_token: settings.bearer_token.map(Zeroizing::new),
        })
    }

    fn url_for<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a String>,
    ) -> Result<Url, DocumentStoreError> {
        let mut url = self.documents_url.clone();
        url.path_segments_mut()
            .map_err(|()| DocumentStoreError::query("documents URL cannot have a path"))?
            .extend(segments);
        Ok(url)
    }

    fn authorised(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token.as_str()),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, DocumentStoreError> {
        self.authorised(request)
            .send()
            .await
            .map_err(map_transport_error)
    }
}

#[async_trait]
impl DocumentStore for FirestoreHttpStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, DocumentStoreError> {
        let url = self.url_for(path.segments())?;
        let response = self.send(self.client.get(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let dto: DocumentDto = decode(response).await?;
        dto.into_document()
            .map(Some)
            .map_err(DocumentStoreError::decode)
    }

    async fn set(&self, path: &DocumentPath, fields: Fields) -> Result<(), DocumentStoreError> {
        let url = self.url_for(path.segments())?;
        let body = encode_document(&fields);
        let response = self.send(self.client.patch(url).json(&body)).await?;
        expect_success(response).await?;
        debug!(%path, "document written");
        Ok(())
    }

    async fn add(
        &self,
        collection: &CollectionPath,
        fields: Fields,
    ) -> Result<DocumentPath, DocumentStoreError> {
        let url = self.url_for(collection.segments())?;
        let body = encode_document(&fields);
        let response = self.send(self.client.post(url).json(&body)).await?;
        let dto: DocumentDto = decode(response).await?;
        let path = dto.path().map_err(DocumentStoreError::decode)?;
        debug!(%path, "document added");
        Ok(path)
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, DocumentStoreError> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut url = self.url_for(collection.segments())?;
            {
                let mut pairs = url.query_pairs_mut();
                pairs.append_pair("pageSize", LIST_PAGE_SIZE);
                if let Some(token) = &page_token {
                    pairs.append_pair("pageToken", token);
                }
            }
            let response = self.send(self.client.get(url)).await?;
            let page: ListDocumentsDto = decode(response).await?;
            for dto in page.documents {
                documents.push(dto.into_document().map_err(DocumentStoreError::decode)?);
            }
            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }
        Ok(documents)
    }

    async fn delete(&self, path: &DocumentPath) -> Result<(), DocumentStoreError> {
        let url = self.url_for(path.segments())?;
        let response = self.send(self.client.delete(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        expect_success(response).await
    }
}

async fn expect_success(response: Response) -> Result<(), DocumentStoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.bytes().await.map_err(map_transport_error)?;
    Err(map_status_error(status, body.as_ref()))
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: Response,
) -> Result<T, DocumentStoreError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    if !status.is_success() {
        return Err(map_status_error(status, body.as_ref()));
    }
    serde_json::from_slice(body.as_ref())
        .map_err(|error| DocumentStoreError::decode(format!("invalid Firestore payload: {error}")))
}

fn map_transport_error(error: reqwest::Error) -> DocumentStoreError {
    DocumentStoreError::connection(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> DocumentStoreError {
    let message = format!("status {}: {}", status.as_u16(), body_preview(body));
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            DocumentStoreError::permission_denied(message)
        }
        StatusCode::REQUEST_TIMEOUT
        | StatusCode::TOO_MANY_REQUESTS
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => DocumentStoreError::connection(message),
        _ => DocumentStoreError::query(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CollectionId, UserId};
    use rstest::{fixture, rstest};

    #[fixture]
    fn store() -> FirestoreHttpStore {
        FirestoreHttpStore::new(FirestoreSettings {
            base_url: Url::parse(DEFAULT_FIRESTORE_URL).expect("base url"),
            project_id: "pinboard-dev".to_owned(),
            bearer_token: None,
            timeout: Duration::from_secs(5),
        })
        .expect("store")
    }

    #[rstest]
    fn document_urls_escape_segments(store: FirestoreHttpStore) {
        let owner = UserId::new("ada").expect("uid");
        let path = DocumentPath::collection(&owner, &CollectionId::new("Travel Plans").expect("id"));
        let url = store.url_for(path.segments()).expect("url");
        assert_eq!(
            url.as_str(),
            "https://firestore.googleapis.com/v1/projects/pinboard-dev/databases/(default)/documents/users/ada/collections/Travel%20Plans"
        );
    }

    #[rstest]
    #[case::forbidden(StatusCode::FORBIDDEN)]
    #[case::unavailable(StatusCode::SERVICE_UNAVAILABLE)]
    #[case::bad_request(StatusCode::BAD_REQUEST)]
    fn maps_http_statuses(#[case] status: StatusCode) {
        let error = map_status_error(status, br#"{"error":{"message":"nope"}}"#);
        match status {
            StatusCode::FORBIDDEN => {
                assert!(matches!(error, DocumentStoreError::PermissionDenied { .. }));
            }
            StatusCode::SERVICE_UNAVAILABLE => {
                assert!(matches!(error, DocumentStoreError::Connection { .. }));
            }
            _ => assert!(matches!(error, DocumentStoreError::Query { .. })),
        }
    }

    #[test]
    fn body_preview_truncates_long_bodies() {
        let body = "x".repeat(400);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), 163);
        assert!(preview.ends_with("..."));
    }
}
