use std::time::{Duration, Instant};

use futures::Stream;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response};
use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS};
use crate::sse::process_sse;
use crate::types::{GenerateContentRequest, GenerateContentResponse, Model};

const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the Gemini generative-language API.
#[derive(Debug, Clone)]
pub struct Gemini {
    api_key: String,
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
}

impl Gemini {
    /// Create a new Gemini client with the default endpoint and timeout.
    ///
    /// The key is used as given; see [`crate::chat::resolve_api_key`] for looking one up.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_options(api_key, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        api_key: impl Into<String>,
        base_url: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::configuration("the API key is empty"));
        }
        if HeaderValue::from_str(&api_key).is_err() {
            return Err(Error::configuration(
                "the API key contains characters that cannot be sent in a header",
            ));
        }

        let base_url = base_url.unwrap_or(DEFAULT_API_URL);
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{base_url}/"))?
        };

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {e}"),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            api_key,
            client,
            base_url,
            timeout,
        })
    }

    /// The request timeout applied to every call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(&self.api_key)
            .map_err(|_| Error::configuration("the API key is not a valid header value"))?;
        headers.insert(API_KEY_HEADER, key);
        Ok(headers)
    }

    fn endpoint(&self, model: &Model, method: &str) -> Result<Url> {
        Ok(self
            .base_url
            .join(&format!("models/{}:{method}", model.path_id()))?)
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        #[derive(Deserialize)]
        struct ErrorResponse {
            error: Option<ErrorDetail>,
        }

        #[derive(Deserialize)]
        struct ErrorDetail {
            message: Option<String>,
            status: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {e}"),
                    Some(Box::new(e)),
                );
            }
        };

        let detail = serde_json::from_str::<ErrorResponse>(&error_body)
            .ok()
            .and_then(|e| e.error);
        let status = detail.as_ref().and_then(|d| d.status.clone());
        let message = detail
            .and_then(|d| d.message)
            .unwrap_or_else(|| error_body.trim().to_string());

        Error::from_status(status_code, status, message, retry_after)
    }

    async fn post(
        &self,
        url: Url,
        headers: HeaderMap,
        body: &GenerateContentRequest,
    ) -> Result<Response> {
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let result = self
            .client
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::timeout(
                        format!("Request timed out: {e}"),
                        Some(self.timeout.as_secs_f64()),
                    )
                } else if e.is_connect() {
                    Error::connection(format!("Connection error: {e}"), Some(Box::new(e)))
                } else {
                    Error::http_client(format!("Request failed: {e}"), Some(Box::new(e)))
                }
            });
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                CLIENT_REQUEST_ERRORS.click();
                return Err(err);
            }
        };
        if !response.status().is_success() {
            CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }
        Ok(response)
    }

    /// Generate a complete response in one round trip.
    pub async fn generate_content(
        &self,
        model: &Model,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = self.endpoint(model, "generateContent")?;
        let response = self.post(url, self.default_headers()?, request).await?;
        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| {
                Error::serialization(format!("Failed to parse response: {e}"), Some(Box::new(e)))
            })
    }

    /// Generate a response as a stream of chunks.
    ///
    /// Each chunk carries the next piece of text; the last one carries the finish reason and
    /// the final usage metadata.
    pub async fn stream_generate_content(
        &self,
        model: &Model,
        request: &GenerateContentRequest,
    ) -> Result<impl Stream<Item = Result<GenerateContentResponse>> + Send + use<>> {
        let mut url = self.endpoint(model, "streamGenerateContent")?;
        url.query_pairs_mut().append_pair("alt", "sse");

        let mut headers = self.default_headers()?;
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/event-stream"),
        );

        let response = self.post(url, headers, request).await?;
        Ok(process_sse(response.bytes_stream()))
    }
}
