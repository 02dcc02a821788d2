use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{ArticleId, TestcaseId, TeststepId},
    error::HttpErrorResponse,
    protocol::{
        Article, AssertionVerificationRequest, AssertionVerificationResult, Endpoint,
        InvocationResponse, Teststep,
    },
};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("resource call failed: {0}")]
    Status(HttpErrorResponse),
    #[error("resource call transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid resource url: {0}")]
    Url(#[from] url::ParseError),
    #[error("{0} id is required for this resource call")]
    MissingId(&'static str),
}

impl ResourceError {
    /// HTTP-shaped view of the failure for error displays. Failures that never
    /// produced an HTTP response are reported with status `0`.
    pub fn to_error_response(&self) -> HttpErrorResponse {
        match self {
            Self::Status(response) => response.clone(),
            Self::Transport(error) => match error.status() {
                Some(status) => HttpErrorResponse::new(
                    status.as_u16(),
                    status.canonical_reason().unwrap_or_default(),
                    Some(error.to_string()),
                ),
                None => HttpErrorResponse::transport(error.to_string()),
            },
            Self::Url(_) | Self::MissingId(_) => HttpErrorResponse::transport(self.to_string()),
        }
    }
}

/// Test step resource: `api/testcases/{testcaseId}/teststeps/{teststepId}`.
#[async_trait]
pub trait TeststepResource: Send + Sync {
    async fn get(
        &self,
        testcase_id: TestcaseId,
        teststep_id: TeststepId,
    ) -> Result<Teststep, ResourceError>;
    async fn update(&self, teststep: &Teststep) -> Result<Teststep, ResourceError>;
    /// Executes the test step against its endpoint. Nothing is persisted.
    async fn run(&self, teststep: &Teststep) -> Result<InvocationResponse, ResourceError>;
}

#[async_trait]
pub trait ArticleResource: Send + Sync {
    async fn save(&self, article: &Article) -> Result<Article, ResourceError>;
    async fn update(&self, article: &Article) -> Result<Article, ResourceError>;
    async fn remove(&self, article: &Article) -> Result<(), ResourceError>;
    async fn query(&self) -> Result<Vec<Article>, ResourceError>;
    async fn get(&self, article_id: ArticleId) -> Result<Article, ResourceError>;
}

/// Action oriented calls that are not REST resources.
#[async_trait]
pub trait JsonService: Send + Sync {
    async fn verify_assertion(
        &self,
        request: &AssertionVerificationRequest,
    ) -> Result<AssertionVerificationResult, ResourceError>;
    async fn find_managed_endpoints_by_type(
        &self,
        endpoint_type: &str,
    ) -> Result<Vec<Endpoint>, ResourceError>;
}

#[derive(Debug, Clone)]
pub struct HttpResourceClient {
    http: Client,
    base_url: Url,
}

impl HttpResourceClient {
    pub fn new(base_url: &str) -> Result<Self, ResourceError> {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ResourceError> {
        let http = Client::builder().timeout(timeout).build()?;
        Self::with_client(base_url, http)
    }

    pub fn with_client(base_url: &str, http: Client) -> Result<Self, ResourceError> {
        let mut base_url = Url::parse(base_url.trim())?;
        // Url::join drops the last path segment unless the base ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ResourceError> {
        Ok(self.base_url.join(path)?)
    }

    fn teststep_url(&self, teststep: &Teststep, action: Option<&str>) -> Result<Url, ResourceError> {
        let testcase_id = teststep.testcase_id.ok_or(ResourceError::MissingId("testcase"))?;
        let teststep_id = teststep.id.ok_or(ResourceError::MissingId("teststep"))?;
        let path = teststep_path(testcase_id, teststep_id);
        match action {
            Some(action) => self.url(&format!("{path}/{action}")),
            None => self.url(&path),
        }
    }

    fn article_url(&self, article: &Article) -> Result<Url, ResourceError> {
        let article_id = article.id.ok_or(ResourceError::MissingId("article"))?;
        self.url(&format!("api/articles/{article_id}"))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ResourceError> {
        let request = request.build()?;
        debug!(method = %request.method(), url = %request.url(), "dispatching resource call");
        let response = self.http.execute(request).await?;
        ensure_success(response).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ResourceError> {
        Ok(self.send(request).await?.json().await?)
    }
}

fn teststep_path(testcase_id: TestcaseId, teststep_id: TeststepId) -> String {
    format!("api/testcases/{testcase_id}/teststeps/{teststep_id}")
}

async fn ensure_success(response: Response) -> Result<Response, ResourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().clone();
    let body = response.text().await.ok().filter(|body| !body.is_empty());
    warn!(%url, status = status.as_u16(), "resource call returned failure status");
    Err(ResourceError::Status(HttpErrorResponse::new(
        status.as_u16(),
        status.canonical_reason().unwrap_or_default(),
        body,
    )))
}

#[async_trait]
impl TeststepResource for HttpResourceClient {
    async fn get(
        &self,
        testcase_id: TestcaseId,
        teststep_id: TeststepId,
    ) -> Result<Teststep, ResourceError> {
        let url = self.url(&teststep_path(testcase_id, teststep_id))?;
        self.send_json(self.http.get(url)).await
    }

    async fn update(&self, teststep: &Teststep) -> Result<Teststep, ResourceError> {
        let url = self.teststep_url(teststep, None)?;
        self.send_json(self.http.put(url).json(teststep)).await
    }

    async fn run(&self, teststep: &Teststep) -> Result<InvocationResponse, ResourceError> {
        let url = self.teststep_url(teststep, Some("run"))?;
        self.send_json(self.http.post(url).json(teststep)).await
    }
}

#[async_trait]
impl ArticleResource for HttpResourceClient {
    async fn save(&self, article: &Article) -> Result<Article, ResourceError> {
        let url = self.url("api/articles")?;
        self.send_json(self.http.post(url).json(article)).await
    }

    async fn update(&self, article: &Article) -> Result<Article, ResourceError> {
        let url = self.article_url(article)?;
        self.send_json(self.http.put(url).json(article)).await
    }

    async fn remove(&self, article: &Article) -> Result<(), ResourceError> {
        let url = self.article_url(article)?;
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    async fn query(&self) -> Result<Vec<Article>, ResourceError> {
        let url = self.url("api/articles")?;
        self.send_json(self.http.get(url)).await
    }

    async fn get(&self, article_id: ArticleId) -> Result<Article, ResourceError> {
        let url = self.url(&format!("api/articles/{article_id}"))?;
        self.send_json(self.http.get(url)).await
    }
}

#[async_trait]
impl JsonService for HttpResourceClient {
    async fn verify_assertion(
        &self,
        request: &AssertionVerificationRequest,
    ) -> Result<AssertionVerificationResult, ResourceError> {
        let url = self.url("api/jsonservice/verifyassertion")?;
        self.send_json(self.http.post(url).json(request)).await
    }

    async fn find_managed_endpoints_by_type(
        &self,
        endpoint_type: &str,
    ) -> Result<Vec<Endpoint>, ResourceError> {
        let url = self.url("api/jsonservice/findManagedEndpointsByType")?;
        self.send_json(self.http.get(url).query(&[("type", endpoint_type)]))
            .await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
