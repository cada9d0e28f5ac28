//! HTTP client for the copilot backend: URL building, mixed-content guard,
//! JSON request/response handling and error normalization.

use reqwest::header::CONTENT_TYPE;
use reqwest::RequestBuilder;
use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::conversation::Submission;
use crate::messages::{
    error_message, DebugRequest, ExplainRequest, GenerateRequest, HealthStatus, Mode,
    RequestResult,
};

/// Scheme of the page hosting the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageScheme {
    Http,
    Https,
    Other,
}

impl PageScheme {
    /// Parse from an origin (`https://host`) or a bare protocol (`https:`).
    pub fn from_origin(origin: &str) -> Self {
        let lower = origin.trim().to_ascii_lowercase();
        if lower.starts_with("https:") {
            PageScheme::Https
        } else if lower.starts_with("http:") {
            PageScheme::Http
        } else {
            PageScheme::Other
        }
    }
}

/// Optional fields attached to every generate/explain/debug request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestDefaults {
    pub model: Option<String>,
    pub language: Option<String>,
    pub system_prompt: Option<String>,
}

impl RequestDefaults {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.api.model.clone(),
            language: config.api.language.clone(),
            system_prompt: config.api.system_prompt.clone(),
        }
    }
}

/// Which of the four failure classes an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    MixedContent,
    Transport,
    Protocol,
}

/// A failed backend call. `Display` is the message shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Required input missing; no request was made.
    #[error("{message}")]
    Validation { message: String },

    /// HTTPS page talking to an HTTP backend; no request was made.
    #[error(
        "Front end is served over HTTPS but backend base URL is HTTP ({base_url}). \
         Browsers block mixed content. Set COPILOT_BACKEND_BASE_URL to an HTTPS URL \
         matching your backend (e.g., https://<host>:3001)."
    )]
    MixedContent { base_url: String },

    /// Connection or DNS failure.
    #[error(
        "{details} Failed to reach {url}. Ensure the backend is running and the base URL \
         is configured. Set COPILOT_BACKEND_BASE_URL to your backend origin \
         (e.g., https://<host>:3001)."
    )]
    Transport {
        url: String,
        details: String,
        #[source]
        source: reqwest::Error,
    },

    /// Backend answered with a non-2xx status.
    #[error("{message}")]
    Protocol {
        url: String,
        status: u16,
        message: String,
        payload: Option<Value>,
    },
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Validation { .. } => ErrorKind::Validation,
            ClientError::MixedContent { .. } => ErrorKind::MixedContent,
            ClientError::Transport { .. } => ErrorKind::Transport,
            ClientError::Protocol { .. } => ErrorKind::Protocol,
        }
    }

    /// HTTP status, for protocol errors only.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Protocol { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Parsed error body, when the backend sent JSON.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            ClientError::Protocol { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }

    /// Request URL, when a request was attempted.
    pub fn url(&self) -> Option<&str> {
        match self {
            ClientError::Transport { url, .. } | ClientError::Protocol { url, .. } => Some(url),
            _ => None,
        }
    }
}

/// Flatten an error and its causes into one line.
fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut cause = err.source();
    while let Some(inner) = cause {
        let text = inner.to_string();
        if !parts.iter().any(|p| p.contains(&text)) {
            parts.push(text);
        }
        cause = inner.source();
    }
    parts.join(": ")
}

/// Backend API client. One per application instance; cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    page_scheme: Option<PageScheme>,
    defaults: RequestDefaults,
}

impl ApiClient {
    /// Client for `base_url`; trailing slashes are dropped.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            page_scheme: None,
            defaults: RequestDefaults::default(),
        }
    }

    /// Client with base URL, page origin and request defaults taken from `config`
    /// (env vars applied).
    pub fn from_config(config: &Config) -> Self {
        Self::from_parts(
            &config.base_url(),
            config.page_origin().as_deref(),
            RequestDefaults::from_config(config),
        )
    }

    /// Client from values that are already resolved; nothing is read from the
    /// environment.
    pub fn from_parts(
        base_url: &str,
        page_origin: Option<&str>,
        defaults: RequestDefaults,
    ) -> Self {
        let client = Self::new(base_url).with_defaults(defaults);
        match page_origin {
            Some(origin) => client.with_page_origin(origin),
            None => client,
        }
    }

    pub fn with_page_origin(mut self, origin: &str) -> Self {
        self.page_scheme = Some(PageScheme::from_origin(origin));
        self
    }

    pub fn with_defaults(mut self, defaults: RequestDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn page_scheme(&self) -> Option<PageScheme> {
        self.page_scheme
    }

    pub fn defaults(&self) -> &RequestDefaults {
        &self.defaults
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fail when an HTTPS page would call an `http://` backend.
    pub fn check_mixed_content(&self) -> Result<(), ClientError> {
        if self.page_scheme == Some(PageScheme::Https) && self.base_url.starts_with("http://") {
            return Err(ClientError::MixedContent {
                base_url: self.base_url.clone(),
            });
        }
        Ok(())
    }

    /// POST `body` as JSON to `path`. Returns the parsed body (`None` when the
    /// response is not JSON or fails to parse).
    pub async fn post_json<B>(&self, path: &str, body: &B) -> Result<Option<Value>, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        self.check_mixed_content()?;
        let request = self.http.post(&url).json(body);
        self.send(url, request).await
    }

    /// GET `path`. Same contract as [`ApiClient::post_json`].
    pub async fn get_json(&self, path: &str) -> Result<Option<Value>, ClientError> {
        let url = self.url(path);
        self.check_mixed_content()?;
        let request = self.http.get(&url);
        self.send(url, request).await
    }

    async fn send(
        &self,
        url: String,
        request: RequestBuilder,
    ) -> Result<Option<Value>, ClientError> {
        tracing::debug!(%url, "sending request");
        let response = match request.send().await {
            Ok(r) => r,
            Err(source) => {
                let details = describe(&source);
                tracing::warn!(%url, error = %details, "backend unreachable");
                return Err(ClientError::Transport {
                    url,
                    details,
                    source,
                });
            }
        };

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false);
        let payload = if is_json {
            match response.text().await {
                Ok(body) => serde_json::from_str::<Value>(&body)
                    .ok()
                    .filter(|v| !v.is_null()),
                Err(e) => {
                    tracing::debug!(%url, error = %e, "failed to read response body");
                    None
                }
            }
        } else {
            None
        };

        if !status.is_success() {
            let message = error_message(payload.as_ref(), status.as_u16());
            tracing::warn!(%url, status = status.as_u16(), %message, "backend returned an error");
            return Err(ClientError::Protocol {
                url,
                status: status.as_u16(),
                message,
                payload,
            });
        }
        tracing::debug!(%url, status = status.as_u16(), "request succeeded");
        Ok(payload)
    }

    /// Liveness probe against `GET /`.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let payload = self.get_json("/").await?;
        Ok(HealthStatus::from_payload(payload.as_ref()))
    }

    /// Connectivity check against `GET /api/hello`; the body is returned as-is.
    pub async fn hello(&self) -> Result<Option<Value>, ClientError> {
        self.get_json("/api/hello").await
    }

    pub async fn generate(&self, request: &GenerateRequest) -> Result<RequestResult, ClientError> {
        if request.prompt.trim().is_empty() {
            return Err(ClientError::validation("Prompt is required."));
        }
        let payload = self.post_json(Mode::Generate.path(), request).await?;
        Ok(RequestResult::from_payload(payload.as_ref()))
    }

    pub async fn explain(&self, request: &ExplainRequest) -> Result<RequestResult, ClientError> {
        if request.code.trim().is_empty() {
            return Err(ClientError::validation("Code is required."));
        }
        let payload = self.post_json(Mode::Explain.path(), request).await?;
        Ok(RequestResult::from_payload(payload.as_ref()))
    }

    pub async fn debug(&self, request: &DebugRequest) -> Result<RequestResult, ClientError> {
        if request.code.trim().is_empty() {
            return Err(ClientError::validation("Code is required."));
        }
        let payload = self.post_json(Mode::Debug.path(), request).await?;
        Ok(RequestResult::from_payload(payload.as_ref()))
    }

    /// Route a submission to the endpoint for its mode, filling in the request defaults.
    pub async fn dispatch(&self, submission: &Submission) -> Result<RequestResult, ClientError> {
        let defaults = self.defaults.clone();
        match submission.mode() {
            Mode::Generate => {
                self.generate(&GenerateRequest {
                    prompt: submission.text().to_string(),
                    language: defaults.language,
                    system_prompt: defaults.system_prompt,
                    model: defaults.model,
                })
                .await
            }
            Mode::Explain => {
                self.explain(&ExplainRequest {
                    code: submission.text().to_string(),
                    language: defaults.language,
                    system_prompt: defaults.system_prompt,
                    model: defaults.model,
                })
                .await
            }
            Mode::Debug => {
                self.debug(&DebugRequest {
                    code: submission.text().to_string(),
                    language: defaults.language,
                    error: submission.error_context().map(str::to_string),
                    system_prompt: defaults.system_prompt,
                    model: defaults.model,
                })
                .await
            }
        }
    }
}
