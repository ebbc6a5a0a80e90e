use reqwest::StatusCode;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection, timeout or body transfer failure. Never retried.
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("table '{table_id}' not found (url: {url})")]
    NotFound { table_id: String, url: String },

    #[error("HTTP {status} for url ({url}){detail}")]
    Http {
        status: u16,
        url: String,
        detail: String,
    },

    #[error("failed to parse response from {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

// {"odata.error":{"code":"","message":{"lang":"en-US","value":"..."}}}
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ODataErrorResponse {
    #[serde(rename = "odata.error", alias = "error")]
    error: ODataErrorBody,
}

#[derive(Debug, serde::Deserialize)]
struct ODataErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<ODataErrorMessage>,
}

// v3 nests the text under `value`, v4 sends a plain string.
#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum ODataErrorMessage {
    Text(String),
    Localized {
        #[serde(default)]
        value: Option<String>,
    },
}

/// Maps a non-success response to an [`Error`].
///
/// A 404 on a table-scoped request is reported as [`Error::NotFound`] so callers
/// can tell a missing table apart from a broken endpoint.
pub(crate) fn format_odata_error(
    status: StatusCode,
    url: &str,
    table_id: Option<&str>,
    body: &str,
) -> Error {
    if status == StatusCode::NOT_FOUND {
        if let Some(table_id) = table_id {
            return Error::NotFound {
                table_id: table_id.to_string(),
                url: url.to_string(),
            };
        }
    }

    let detail = match serde_json::from_str::<ODataErrorResponse>(body) {
        Ok(e) => {
            let message = match &e.error.message {
                Some(ODataErrorMessage::Text(s)) => s.as_str(),
                Some(ODataErrorMessage::Localized { value }) => value.as_deref().unwrap_or(""),
                None => "",
            };
            let code = e.error.code.as_deref().unwrap_or("");
            match (code.is_empty(), message.is_empty()) {
                (true, true) => String::new(),
                (true, false) => format!("\n{}", message),
                (false, true) => format!("\ncode: {}", code),
                (false, false) => format!("\n{} (code: {})", message, code),
            }
        }
        Err(_) => {
            let body = body.trim();
            if body.is_empty() {
                String::new()
            } else {
                // Error pages can be large HTML documents.
                let snippet: String = body.chars().take(200).collect();
                format!("\n{}", snippet)
            }
        }
    };

    Error::Http {
        status: status.as_u16(),
        url: url.to_string(),
        detail,
    }
}
