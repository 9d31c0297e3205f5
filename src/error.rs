//! Error types shared by the data sources.

use thiserror::Error;

/// Errors raised while configuring or querying a data source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// A required credential was absent or blank.
    #[error("missing required credential: {0} is not set")]
    MissingCredential(&'static str),

    /// The upstream API answered with a non-success status.
    #[error("{source_name} request failed with status {status}: {body}")]
    Upstream {
        source_name: &'static str,
        status: u16,
        body: String,
    },

    /// The service-account key could not be used to sign an assertion.
    #[error("service-account authentication failed: {0}")]
    Auth(#[from] jsonwebtoken::errors::Error),

    /// Transport-level failure (DNS, TLS, connection reset, ...).
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// The response body was not the JSON shape we expected.
    #[error("failed to decode {source_name} response: {message}")]
    Decode {
        source_name: &'static str,
        message: String,
    },
}

impl SourceError {
    /// Build an upstream error from a failed response, consuming its body.
    pub async fn from_response(source_name: &'static str, response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<unreadable body: {}>", e));

        SourceError::Upstream {
            source_name,
            status,
            body,
        }
    }
}

pub type SourceResult<T> = std::result::Result<T, SourceError>;
