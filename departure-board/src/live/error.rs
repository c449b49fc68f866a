/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Errors from one live departure-board fetch.
//!
//! All of them are transient from the board's point of view: the runner
//! shows a single error line and tries again on the next refresh tick.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LiveError {
    /// Connection, TLS, timeout or body-read failure.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status (SOAP faults arrive as
    /// HTTP 500).
    #[error("service answered HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("response is not well-formed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The response parsed but lacks the element every board answer carries.
    #[error("response has no <{0}> element")]
    MissingElement(&'static str),
}
