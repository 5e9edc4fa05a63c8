use reqwest::StatusCode;

/// Failures talking to the manuals backend.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("backend returned {status} for {url}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("could not parse response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    pub fn url(&self) -> &str {
        match self {
            ClientError::Transport { url, .. }
            | ClientError::Status { url, .. }
            | ClientError::Decode { url, .. } => url,
        }
    }
}

/// Input problems caught before any request is sent. The display text is
/// what the user sees in the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please select a product.")]
    MissingProduct,
    #[error("Please enter a question.")]
    MissingQuestion,
    #[error("Please select both products to compare.")]
    MissingComparisonProducts,
}
