// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Unified error types for the zonectl library.
//!
//! This module provides the error hierarchy shared by the management
//! client, the inventory sources, and the command implementations.

use thiserror::Error;

/// The main error type for zonectl operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid command-line or source configuration.
    ///
    /// This is a fatal setup error; nothing has been mutated when it
    /// is raised.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An HTTP request could not be completed.
    ///
    /// Covers connectivity and authentication failures against the
    /// management API or the cloud inventory API.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The remote API rejected a request.
    ///
    /// Carries the HTTP status and the (truncated) response body. During
    /// an apply phase this is recorded per item rather than aborting the
    /// run.
    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    /// An asynchronous task ended in a non-success state or timed out.
    #[error("Task did not complete: {0}")]
    Task(String),

    /// A node or volume filter pattern failed to compile.
    #[error(transparent)]
    Pattern(#[from] regex::Error),

    /// A base URL could not be constructed.
    #[error(transparent)]
    Url(#[from] url::ParseError),

    /// An I/O error occurred while reading inventory files or writing
    /// the report.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for zonectl operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build an [`Error::Api`] from a status code and response body,
    /// truncating the body the way the management API's verbose
    /// validation messages require.
    pub fn api(status: u16, body: &str) -> Self {
        let mut message = body.to_string();
        if let Some((cut, _)) = message.char_indices().nth(500) {
            message.truncate(cut);
        }
        Error::Api { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Config("either --fabric-file or --compartment-id is required".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: either --fabric-file or --compartment-id is required"
        );

        let err = Error::Api {
            status: 400,
            message: "name already in use".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API request failed with status 400: name already in use"
        );

        let err = Error::Task("timed out after 120s".to_string());
        assert_eq!(err.to_string(), "Task did not complete: timed out after 120s");
    }

    #[test]
    fn test_api_truncates_long_bodies() {
        let body = "x".repeat(2000);
        let err = Error::api(500, &body);
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message.len(), 500);
            }
            other => panic!("Expected Api error, got: {other}"),
        }
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
