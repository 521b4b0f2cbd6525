// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Errors raised while talking to the container API

use std::time::Duration;
use thiserror::Error;

/// Result alias for container operations
pub type ContainerResult<T> = Result<T, ContainerError>;

/// Failure of a container API operation
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Transport or body decoding failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The container answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Requested URL
        url: String,
        /// Status code
        status: u16,
    },

    /// A resource lacked the link relation needed for the next hop
    #[error("resource has no '{rel}' link")]
    MissingLink {
        /// Link relation name
        rel: String,
    },

    /// A collection did not contain the element looked for
    #[error("{what} '{key}' not found")]
    NotFound {
        /// Kind of element
        what: &'static str,
        /// Lookup key
        key: String,
    },

    /// A poll did not produce a result in time
    #[error("no result within {0:?}")]
    Timeout(Duration),
}

impl ContainerError {
    pub(crate) fn not_found(what: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            key: key.into(),
        }
    }
}
