use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("failed to deserialize response: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("missing configuration: {0}")]
    Config(&'static str),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

pub(crate) fn parse_base_url(raw: &str) -> ClientResult<url::Url> {
    let trimmed = raw.trim();
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(ClientError::InvalidUrl(format!(
            "URL must start with http:// or https://, got: {trimmed}"
        )));
    }
    url::Url::parse(trimmed).map_err(|err| ClientError::InvalidUrl(format!("{trimmed}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_urls_without_scheme() {
        match parse_base_url("restcountries.com/v3.1/all") {
            Err(ClientError::InvalidUrl(msg)) => assert!(msg.contains("http://")),
            other => panic!("expected InvalidUrl, got {other:?}"),
        }
    }

    #[test]
    fn api_error_reports_status() {
        let err = ClientError::Api {
            status: 404,
            message: "not found".into(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(ClientError::Config("endpoint").status(), None);
    }
}
