//! Error types for formfetch infrastructure
//!
//! Request failures are not errors of this kind: they surface to consumers
//! as [`crate::models::ServerError`] through the fetch lifecycle state.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormFetchError {
    #[error("Failed to read token store at {path}: {source}")]
    TokenStoreRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write token store at {path}: {source}")]
    TokenStoreWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Token store at {path} is not a JSON object: {source}")]
    TokenStoreFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("HTTP client could not be built: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Unsupported method: {0}. Supported methods: GET, POST, PUT, PATCH, DELETE")]
    UnsupportedMethod(String),
}

