//! Error types for the store client

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Write rejected ({status}): {body}")]
    Write { status: u16, body: String },

    #[error("Query rejected ({status}): {body}")]
    Query { status: u16, body: String },

    #[error("Malformed query response: {0}")]
    Response(String),
}
