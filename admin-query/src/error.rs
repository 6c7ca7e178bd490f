//! Error types for query service operations.

/// Errors returned by a [`QueryService`](crate::QueryService).
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The HTTP request could not be sent or the response could not be read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success HTTP status.
    #[error("server responded with status {0}")]
    Status(u16),

    /// The server answered with one or more GraphQL errors.
    #[error("query failed: {}", .0.join("; "))]
    Graphql(Vec<String>),

    /// The response carried neither data nor errors.
    #[error("response contained no data")]
    MissingData,

    /// The response data did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The service is not able to answer right now.
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

/// Result alias for query service operations.
pub type Result<T> = std::result::Result<T, QueryError>;
