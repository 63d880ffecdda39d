//! HTTP gateway to the Master Patient Index

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use thiserror::Error;
use url::Url;

use crate::config::MpiConfig;

const FHIR_JSON: &str = "application/fhir+json";

/// Network or HTTP-level failure talking to the MPI
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid MPI URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("MPI request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("MPI returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Raw request/response access to the MPI.
///
/// Paths are relative to the MPI base URL; queries are already encoded.
/// Implementations return the response body as text.
pub trait Gateway: Send + Sync {
    fn get(
        &self,
        path: &str,
        query: &str,
    ) -> impl Future<Output = Result<String, TransportError>> + Send;

    fn post(
        &self,
        path: &str,
        body: String,
    ) -> impl Future<Output = Result<String, TransportError>> + Send;

    fn put(
        &self,
        path: &str,
        query: &str,
        body: String,
    ) -> impl Future<Output = Result<String, TransportError>> + Send;
}

/// reqwest-backed gateway
#[derive(Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: Url,
    credentials: Option<(String, String)>,
}

impl HttpGateway {
    pub fn new(config: &MpiConfig) -> Result<Self, TransportError> {
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let credentials = match (&config.username, &config.password) {
            (Some(user), password) => Some((user.clone(), password.clone().unwrap_or_default())),
            (None, _) => None,
        };

        Ok(Self {
            http: builder.build()?,
            base_url: Url::parse(&base)?,
            credentials,
        })
    }

    fn url(&self, path: &str, query: &str) -> Result<Url, TransportError> {
        let mut url = self.base_url.join(path)?;
        if !query.is_empty() {
            url.set_query(Some(query));
        }
        Ok(url)
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &str,
        body: Option<String>,
    ) -> Result<String, TransportError> {
        tracing::debug!(method = %method, path = path, query = query, "MPI request");

        let result = self.send(method.clone(), path, query, body).await;

        let outcome = if result.is_ok() { "success" } else { "error" };
        metrics::counter!(
            "mpi_requests_total",
            "method" => method.to_string(),
            "path" => path.to_string(),
            "outcome" => outcome
        )
        .increment(1);

        if let Err(e) = &result {
            tracing::warn!(error = %e, method = %method, path = path, "MPI request failed");
        }
        result
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &str,
        body: Option<String>,
    ) -> Result<String, TransportError> {
        let mut request = self
            .http
            .request(method, self.url(path, query)?)
            .header(ACCEPT, FHIR_JSON);

        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, Some(password));
        }
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, FHIR_JSON).body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(TransportError::Status { status, body: text });
        }
        Ok(text)
    }
}

impl Gateway for HttpGateway {
    async fn get(&self, path: &str, query: &str) -> Result<String, TransportError> {
        self.execute(Method::GET, path, query, None).await
    }

    async fn post(&self, path: &str, body: String) -> Result<String, TransportError> {
        self.execute(Method::POST, path, "", Some(body)).await
    }

    async fn put(&self, path: &str, query: &str, body: String) -> Result<String, TransportError> {
        self.execute(Method::PUT, path, query, Some(body)).await
    }
}
