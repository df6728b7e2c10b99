//! HTTP/JSON implementation of the diagram store.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::domain::{Diagram, DiagramUpdate};
use crate::infrastructure::traits::{DiagramStore, StoreError};
use crate::infrastructure::{InfraError, InfraResult};

const LIST_FAILED: &str = "Failed to fetch diagrams";
const GET_FAILED: &str = "Failed to fetch diagram";
const CREATE_FAILED: &str = "Failed to add diagram";
const UPDATE_FAILED: &str = "Failed to update diagram";
const DELETE_FAILED: &str = "Failed to delete diagram";

/// Talks to `{base_url}/diagrams`.
#[derive(Debug, Clone)]
pub struct HttpDiagramStore {
    base_url: Url,
    client: Client,
}

impl HttpDiagramStore {
    pub fn new(base_url: &str, timeout: Duration) -> InfraResult<Self> {
        let base_url = parse_base_url(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InfraError::Http {
                context: "build http client".into(),
                source: e,
            })?;
        Ok(Self { base_url, client })
    }

    fn diagrams_url(&self) -> Url {
        self.endpoint(None)
    }

    /// Ids go in as one percent-encoded path segment.
    fn diagram_url(&self, id: &str) -> Url {
        self.endpoint(Some(id))
    }

    fn endpoint(&self, id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("diagrams");
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }

    /// Send and turn any non-success status into `StoreError::Rejected`.
    async fn send(&self, request: RequestBuilder, fallback: &str) -> Result<Response, StoreError> {
        let response = request.send().await.map_err(|e| StoreError::Transport {
            message: fallback.to_string(),
            cause: e.to_string(),
        })?;

        let status = response.status();
        debug!("store responded {}", status);
        if status.is_success() {
            return Ok(response);
        }
        // an unreadable body still yields the fallback message
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Rejected {
            status: status.as_u16(),
            message: extract_error_message(&body, fallback),
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<T, StoreError> {
        let response = self.send(request, fallback).await?;
        response.json::<T>().await.map_err(|e| StoreError::Decode {
            message: fallback.to_string(),
            cause: e.to_string(),
        })
    }
}

fn parse_base_url(raw: &str) -> InfraResult<Url> {
    let invalid = |reason: String| {
        InfraError::from(ApplicationError::Config {
            message: format!("invalid server url '{}': {}", raw, reason),
        })
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("not a hierarchical url".into()));
    }
    Ok(url)
}

/// Pick the server's explanation out of an error body.
///
/// Looks for a string `detail` or `message` field; anything else yields
/// `fallback`.
pub fn extract_error_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["detail", "message"]
                .iter()
                .find_map(|key| value.get(key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .filter(|msg| !msg.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[async_trait]
impl DiagramStore for HttpDiagramStore {
    #[instrument(level = "debug", skip(self))]
    async fn list_diagrams(&self) -> Result<Vec<Diagram>, StoreError> {
        self.send_json(self.client.get(self.diagrams_url()), LIST_FAILED)
            .await
    }

    #[instrument(level = "debug", skip(self))]
    async fn get_diagram(&self, id: &str) -> Result<Diagram, StoreError> {
        self.send_json(self.client.get(self.diagram_url(id)), GET_FAILED)
            .await
    }

    #[instrument(level = "debug", skip(self))]
    async fn create_diagram(&self, title: &str) -> Result<Diagram, StoreError> {
        let body = serde_json::json!({ "title": title });
        self.send_json(self.client.post(self.diagrams_url()).json(&body), CREATE_FAILED)
            .await
    }

    #[instrument(level = "debug", skip(self, update))]
    async fn update_diagram(&self, id: &str, update: DiagramUpdate) -> Result<Diagram, StoreError> {
        self.send_json(
            self.client.patch(self.diagram_url(id)).json(&update),
            UPDATE_FAILED,
        )
        .await
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete_diagram(&self, id: &str) -> Result<(), StoreError> {
        self.send(self.client.delete(self.diagram_url(id)), DELETE_FAILED)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_detail_body_when_extracting_then_returns_detail() {
        let msg = extract_error_message(r#"{"detail": "Diagram not found"}"#, GET_FAILED);
        assert_eq!(msg, "Diagram not found");
    }

    #[test]
    fn given_message_body_when_extracting_then_returns_message() {
        let msg = extract_error_message(r#"{"message": "nope"}"#, GET_FAILED);
        assert_eq!(msg, "nope");
    }

    #[test]
    fn given_non_json_body_when_extracting_then_falls_back() {
        assert_eq!(extract_error_message("<html>502</html>", UPDATE_FAILED), UPDATE_FAILED);
        assert_eq!(extract_error_message("", DELETE_FAILED), DELETE_FAILED);
    }

    #[test]
    fn given_structured_detail_when_extracting_then_falls_back() {
        // validation errors carry a list, not a sentence
        let body = r#"{"detail": [{"loc": ["body", "title"], "msg": "field required"}]}"#;
        assert_eq!(extract_error_message(body, CREATE_FAILED), CREATE_FAILED);
    }

    #[test]
    fn given_trailing_slash_when_building_urls_then_not_doubled() {
        let store = HttpDiagramStore::new("http://localhost:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(store.diagrams_url().as_str(), "http://localhost:8080/diagrams");
        assert_eq!(store.diagram_url("abc").as_str(), "http://localhost:8080/diagrams/abc");
    }

    #[test]
    fn given_base_path_when_building_urls_then_diagrams_appended() {
        let store = HttpDiagramStore::new("http://localhost:8080/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(store.diagram_url("abc").as_str(), "http://localhost:8080/api/diagrams/abc");
    }

    #[test]
    fn given_reserved_chars_in_id_when_building_url_then_single_encoded_segment() {
        // Arrange
        let store = HttpDiagramStore::new("http://localhost:8080", Duration::from_secs(1)).unwrap();

        // Act
        let url = store.diagram_url("a/b?c#d");

        // Assert
        assert_eq!(url.as_str(), "http://localhost:8080/diagrams/a%2Fb%3Fc%23d");
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }

    #[test]
    fn given_unparseable_server_url_when_building_store_then_config_error() {
        for raw in ["localhost:8080/no scheme", "not a url", "mailto:ops@example.com"] {
            let err = HttpDiagramStore::new(raw, Duration::from_secs(1)).unwrap_err();
            assert!(
                matches!(err, InfraError::Application(ApplicationError::Config { .. })),
                "{raw}: {err}"
            );
        }
    }
}
