use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body returned by the backend service on non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: u16,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl BackendError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            kind: String::new(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.code == 401
    }
}

#[derive(Debug, Error)]
#[error("backend error {code}: {message}")]
pub struct BackendException {
    pub code: u16,
    pub kind: String,
    pub message: String,
}

impl From<BackendError> for BackendException {
    fn from(value: BackendError) -> Self {
        Self {
            code: value.code,
            kind: value.kind,
            message: value.message,
        }
    }
}
