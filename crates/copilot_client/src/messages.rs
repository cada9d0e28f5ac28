//! Backend JSON shapes. Client → server request bodies, server → client results.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Operation selected by the user; picks the endpoint and payload shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Generate,
    Explain,
    Debug,
}

impl Mode {
    pub fn all() -> [Mode; 3] {
        [Mode::Generate, Mode::Explain, Mode::Debug]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Generate => "generate",
            Mode::Explain => "explain",
            Mode::Debug => "debug",
        }
    }

    /// Backend endpoint for this mode.
    pub fn path(&self) -> &'static str {
        match self {
            Mode::Generate => "/generate",
            Mode::Explain => "/explain",
            Mode::Debug => "/debug",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Generate => "Generate",
            Mode::Explain => "Explain",
            Mode::Debug => "Debug",
        }
    }

    /// Input hint shown while this mode is selected.
    pub fn placeholder(&self) -> &'static str {
        match self {
            Mode::Generate => "Describe what you want to build...",
            Mode::Explain => "Paste code you want explained...",
            Mode::Debug => "Paste code and optionally include errors...",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "generate" => Ok(Mode::Generate),
            "explain" => Ok(Mode::Explain),
            "debug" => Ok(Mode::Debug),
            other => Err(format!(
                "unknown mode: {} (expected generate, explain or debug)",
                other
            )),
        }
    }
}

/// Client → server: `POST /generate`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Client → server: `POST /explain`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainRequest {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Client → server: `POST /debug`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugRequest {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Server → client: completion result shared by generate/explain/debug.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestResult {
    pub content: Option<String>,
    pub model: Option<String>,
    pub usage: Option<Value>,
}

impl RequestResult {
    /// Build from a parsed body. `None` (non-JSON or unparsable body) gives an empty result;
    /// fields of the wrong type are treated as absent.
    pub fn from_payload(payload: Option<&Value>) -> Self {
        let Some(value) = payload else {
            return Self::default();
        };
        Self {
            content: str_field(value, "content"),
            model: str_field(value, "model"),
            usage: value.get("usage").filter(|u| !u.is_null()).cloned(),
        }
    }
}

/// Server → client: `GET /` liveness payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HealthStatus {
    pub message: Option<String>,
}

impl HealthStatus {
    pub fn from_payload(payload: Option<&Value>) -> Self {
        Self {
            message: payload.and_then(|v| str_field(v, "message")),
        }
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

/// Message for a non-2xx response: `error.message`, then `message`, then a generic
/// line carrying the status code.
pub fn error_message(payload: Option<&Value>, status: u16) -> String {
    let nested = payload
        .and_then(|p| p.get("error"))
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str());
    let flat = payload
        .and_then(|p| p.get("message"))
        .and_then(|m| m.as_str());
    nested
        .filter(|m| !m.is_empty())
        .or(flat.filter(|m| !m.is_empty()))
        .map(str::to_string)
        .unwrap_or_else(|| format!("Request failed with status {}", status))
}
