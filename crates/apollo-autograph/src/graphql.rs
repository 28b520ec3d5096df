//! Execution boundary for synthesized operations

use reqwest::header::HeaderMap;
use serde_json::{Map, Value};
use url::Url;

/// A synthesized operation on its way to an execution client
pub struct Request<'a> {
    /// The operation document text
    pub query: &'a str,

    /// The name of the operation within the document
    pub operation_name: &'a str,

    /// JSON variables referenced by the document
    pub variables: &'a Map<String, Value>,
}

/// Able to execute a GraphQL operation
///
/// The library never interprets what the client returns: the response JSON
/// and any client error pass back to the caller unmodified.
#[allow(async_fn_in_trait)]
pub trait GraphqlClient {
    type Error: std::error::Error;

    /// Execute the operation, returning the raw GraphQL response
    async fn execute(&self, request: Request<'_>) -> Result<Value, Self::Error>;
}

/// An error from the bundled HTTP client
#[derive(Debug, thiserror::Error)]
pub enum HttpClientError {
    #[error("Failed to send GraphQL request: {0}")]
    Send(reqwest::Error),

    #[error("Failed to read GraphQL response body: {0}")]
    Body(reqwest::Error),
}

/// A GraphQL endpoint reachable over HTTP
///
/// Posts `{query, variables, operationName}` as JSON and returns the
/// response body as-is, errors and all.
pub struct HttpEndpoint {
    endpoint: Url,
    headers: HeaderMap,
    client: reqwest::Client,
}

impl HttpEndpoint {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            headers: HeaderMap::new(),
            client: reqwest::Client::new(),
        }
    }

    /// Default headers sent with every request
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}

impl GraphqlClient for HttpEndpoint {
    type Error = HttpClientError;

    async fn execute(&self, request: Request<'_>) -> Result<Value, Self::Error> {
        let request_body = serde_json::json!({
            "query": request.query,
            "variables": request.variables,
            "operationName": request.operation_name,
        });

        self.client
            .post(self.endpoint.clone())
            .headers(self.headers.clone())
            .json(&request_body)
            .send()
            .await
            .map_err(HttpClientError::Send)?
            .json::<Value>()
            .await
            .map_err(HttpClientError::Body)
    }
}
