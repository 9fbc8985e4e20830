//! Error types for the task API client.
//!
//! # Design
//! `NotFound` and `Validation` get dedicated variants because the UI reacts
//! to them differently from generic server failures. Every other non-success
//! response lands in `Http` with the server's error text when the body is an
//! envelope, or the raw body otherwise.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The server returned 404.
    #[error("task not found")]
    NotFound,

    /// The server rejected the request with 400.
    #[error("{0}")]
    Validation(String),

    /// The server returned some other unexpected status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The host could not complete the exchange.
    #[error("request failed: {0}")]
    Transport(String),

    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("serialization failed: {0}")]
    Serialization(String),
}
