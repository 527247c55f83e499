//! Che server REST client using reqwest

use async_trait::async_trait;
use chesync_core::config::ApiConfig;
use chesync_core::{Factory, Workspace, WorkspaceApi};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use crate::{Error, Result};

/// Client for the workspace and factory endpoints of a Che server
#[derive(Clone)]
pub struct CheClient {
    http: Client,
    base: Url,
    workspace_id: Option<String>,
}

impl CheClient {
    /// Create a client for the API rooted at `base_url`
    ///
    /// When a machine token is given it is sent as a bearer credential with
    /// every request.
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(Error::Parse(format!("Not a base URL: {}", base_url)));
        }

        let mut headers = HeaderMap::new();
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| Error::Parse(format!("Invalid machine token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("chesync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!(base = %base, "Created Che API client");

        Ok(Self {
            http,
            base,
            workspace_id: None,
        })
    }

    /// Set the id of the workspace this process runs in
    pub fn with_workspace_id(mut self, id: impl Into<String>) -> Self {
        self.workspace_id = Some(id.into());
        self
    }

    /// Create a client from resolved configuration
    ///
    /// The API URL usually comes from `CHE_API_INTERNAL`, the token from
    /// `CHE_MACHINE_TOKEN` and the workspace id from `CHE_WORKSPACE_ID`.
    pub fn from_config(api: &ApiConfig) -> Result<Self> {
        let url = api
            .url
            .as_deref()
            .ok_or_else(|| Error::MissingEnv("CHE_API_INTERNAL".to_string()))?;

        let client = Self::new(url, api.token.as_deref())?;
        Ok(match &api.workspace_id {
            Some(id) => client.with_workspace_id(id.clone()),
            None => client,
        })
    }

    /// API base URL
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// URL of `segments` below the API base
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Parse(format!("Not a base URL: {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn current_workspace_id(&self) -> Result<&str> {
        self.workspace_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::MissingEnv("CHE_WORKSPACE_ID".to_string()))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response".to_string());
            return Err(Error::Status { status, body });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::Parse(format!("Failed to parse Che API response: {}", e)))
    }

    /// Fetch workspace `id`
    pub async fn get_workspace(&self, id: &str) -> Result<Workspace> {
        let url = self.endpoint(&["workspace", id])?;
        debug!(%url, "Fetching workspace");
        self.send(self.http.get(url)).await
    }

    /// Replace the definition of workspace `id`, returning the stored result
    pub async fn put_workspace(&self, id: &str, workspace: &Workspace) -> Result<Workspace> {
        let url = self.endpoint(&["workspace", id])?;
        debug!(%url, projects = workspace.config.projects.len(), "Updating workspace");
        self.send(self.http.put(url).json(workspace)).await
    }

    /// Fetch factory `id`
    pub async fn get_factory(&self, id: &str) -> Result<Factory> {
        let url = self.endpoint(&["factory", id])?;
        debug!(%url, "Fetching factory");
        self.send(self.http.get(url)).await
    }
}

impl std::fmt::Debug for CheClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheClient")
            .field("base", &self.base.as_str())
            .field("workspace_id", &self.workspace_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl WorkspaceApi for CheClient {
    async fn current_workspace(&self) -> chesync_core::Result<Workspace> {
        let id = self.current_workspace_id()?;
        Ok(self.get_workspace(id).await?)
    }

    async fn update_workspace(&self, id: &str, workspace: &Workspace) -> chesync_core::Result<()> {
        self.put_workspace(id, workspace).await?;
        Ok(())
    }

    async fn factory(&self, id: &str) -> chesync_core::Result<Factory> {
        Ok(self.get_factory(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_segments() {
        let client = CheClient::new("http://che-host:8080/api", None).unwrap();
        assert_eq!(
            client.endpoint(&["workspace", "workspace123"]).unwrap().as_str(),
            "http://che-host:8080/api/workspace/workspace123"
        );
    }

    #[test]
    fn test_endpoint_with_trailing_slash() {
        let client = CheClient::new("http://che-host:8080/api/", Some("token")).unwrap();
        assert_eq!(
            client.endpoint(&["factory", "f1"]).unwrap().as_str(),
            "http://che-host:8080/api/factory/f1"
        );
    }

    #[test]
    fn test_endpoint_escapes_ids() {
        let client = CheClient::new("http://che-host/api", None).unwrap();
        assert_eq!(
            client.endpoint(&["factory", "a/b"]).unwrap().as_str(),
            "http://che-host/api/factory/a%2Fb"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(CheClient::new("not a url", None), Err(Error::Parse(_))));
        assert!(matches!(
            CheClient::new("mailto:dev@example.com", None),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_from_config_requires_url() {
        let err = CheClient::from_config(&ApiConfig::default()).unwrap_err();
        assert!(matches!(err, Error::MissingEnv(ref name) if name == "CHE_API_INTERNAL"));
    }

    #[tokio::test]
    async fn test_current_workspace_requires_id() {
        let client = CheClient::from_config(&ApiConfig {
            url: Some("http://127.0.0.1:9/api".to_string()),
            token: None,
            workspace_id: None,
        })
        .unwrap();

        let err = client.current_workspace().await.unwrap_err();
        assert!(
            matches!(err, chesync_core::Error::Api(ref msg) if msg.contains("CHE_WORKSPACE_ID"))
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_an_api_error() {
        let client = CheClient::new("http://127.0.0.1:9/api", None)
            .unwrap()
            .with_workspace_id("ws1");

        let err = client.current_workspace().await.unwrap_err();
        assert!(matches!(err, chesync_core::Error::Api(_)));
    }
}
