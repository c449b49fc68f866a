/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Live departures from the National Rail OpenLDBWS service.
//!
//! One SOAP `GetDepartureBoardRequest` per fetch; the answer is read by local
//! element name so the service's namespace prefixes (`lt4:`, `lt5:`, ...)
//! can change without breaking the parser.
//!
//! ```text
//! Envelope/Body/GetDepartureBoardResponse/GetStationBoardResult
//!   └── trainServices/service*
//!         ├── std                                  → scheduled time
//!         ├── etd                                  → status
//!         ├── platform
//!         └── destination/location/locationName   → destination
//! ```
//!
//! A missing field inside a service becomes an empty string for that field;
//! it never drops the row or fails the fetch.

pub mod error;

pub use error::LiveError;

use std::time::Duration;

use chrono::NaiveDateTime;
use quick_xml::escape::escape;
use roxmltree::{Document, Node};
use tracing::{debug, info};

use crate::board::{parse_clock_time, DepartureRow, Status, ON_TIME_TEXT};
use crate::config::LiveConfig;

const SOAP_CONTENT_TYPE: &str = "text/xml";

// ── LiveBoardClient ───────────────────────────────────────────────────────────

/// Fetches the departure board for one station.
pub struct LiveBoardClient {
    http: reqwest::Client,
    config: LiveConfig,
}

impl LiveBoardClient {
    /// Build a client.  No request timeout is set unless
    /// `config.timeout_secs` asks for one.
    pub fn new(config: LiveConfig) -> Result<Self, LiveError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(|source| LiveError::Transport {
            url: config.endpoint_url.clone(),
            source,
        })?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &LiveConfig {
        &self.config
    }

    /// Ask the service for the next departures and convert them to rows.
    ///
    /// `now` anchors the bare `HH:MM` times in the answer to a date.
    pub async fn fetch(&self, now: NaiveDateTime) -> Result<Vec<DepartureRow>, LiveError> {
        let url = &self.config.endpoint_url;
        debug!(url = %url, station = %self.config.station_code, "Requesting live departures");

        let transport = |source| LiveError::Transport {
            url: url.clone(),
            source,
        };

        let response = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .body(request_envelope(&self.config))
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LiveError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(transport)?;
        let rows = parse_departure_board(&body, now, self.config.rows as usize)?;

        info!(
            station = %self.config.station_code,
            rows = rows.len(),
            "Live departures received"
        );
        Ok(rows)
    }
}

// ── Request ───────────────────────────────────────────────────────────────────

/// SOAP 1.2 envelope for `GetDepartureBoardRequest`.
///
/// `filterCrs` is only sent when a destination filter is configured.
pub fn request_envelope(config: &LiveConfig) -> String {
    let filter = config
        .destination_filter()
        .map(|crs| {
            format!(
                "<ns0:filterCrs>{}</ns0:filterCrs><ns0:filterType>to</ns0:filterType>",
                escape(crs)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://www.w3.org/2003/05/soap-envelope" xmlns:types="http://thalesgroup.com/RTTI/2013-11-28/Token/types" xmlns:ns0="http://thalesgroup.com/RTTI/2017-10-01/ldb/">
<SOAP-ENV:Header>
<types:AccessToken><types:TokenValue>{key}</types:TokenValue></types:AccessToken>
</SOAP-ENV:Header>
<SOAP-ENV:Body>
<ns0:GetDepartureBoardRequest>
<ns0:numRows>{rows}</ns0:numRows>
<ns0:crs>{crs}</ns0:crs>{filter}
<ns0:timeOffset>{offset}</ns0:timeOffset>
<ns0:timeWindow>{window}</ns0:timeWindow>
</ns0:GetDepartureBoardRequest>
</SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#,
        key = escape(config.api_key.trim()),
        rows = config.rows,
        crs = escape(config.station_code.trim()),
        filter = filter,
        offset = config.time_offset_minutes,
        window = config.time_window_minutes,
    )
}

// ── Response ──────────────────────────────────────────────────────────────────

/// Parse a `GetDepartureBoardResponse` into at most `max_rows` rows.
///
/// A board without `trainServices` (nothing due in the time window) is an
/// empty, successful answer.
pub fn parse_departure_board(
    xml: &str,
    now: NaiveDateTime,
    max_rows: usize,
) -> Result<Vec<DepartureRow>, LiveError> {
    let doc = Document::parse(xml)?;

    let result = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "GetStationBoardResult")
        .ok_or(LiveError::MissingElement("GetStationBoardResult"))?;

    let Some(services) = child(result, "trainServices") else {
        debug!("Live board has no train services");
        return Ok(Vec::new());
    };

    Ok(services
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "service")
        .take(max_rows)
        .map(|service| service_row(service, now))
        .collect())
}

fn service_row(service: Node<'_, '_>, now: NaiveDateTime) -> DepartureRow {
    let std = text_at(service, &["std"]);
    let etd = text_at(service, &["etd"]);
    let platform = text_at(service, &["platform"]);
    let destination = text_at(service, &["destination", "location", "locationName"]);

    DepartureRow::new(parse_clock_time(&std, now), &destination, platform, status_from_etd(&etd, now))
}

fn status_from_etd(etd: &str, now: NaiveDateTime) -> Status {
    if etd.eq_ignore_ascii_case(ON_TIME_TEXT) {
        return Status::OnTime;
    }
    match parse_clock_time(etd, now) {
        Some(t) => Status::Expected(t),
        None => Status::Reported(etd.to_string()),
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
}

/// Trimmed text at `path` below `node`, or `""` if any step is missing.
fn text_at(node: Node<'_, '_>, path: &[&str]) -> String {
    path.iter()
        .try_fold(node, |n, name| child(n, name))
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
