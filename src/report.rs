//! Rendering of the final response for the command line.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::http::Response;

#[derive(Debug, Serialize)]
struct ResponseReport<'a> {
    status: u16,
    status_text: &'a str,
    headers: &'a BTreeMap<String, Vec<String>>,
    body: String,
}

/// Formats a response as `post: <status> <body>`.
pub fn render_text(response: &Response) -> String {
    format!("post: {} {}", response.status, response.body_text())
}

/// Formats a response as a pretty-printed JSON object.
pub fn render_json(response: &Response) -> Result<String> {
    let report = ResponseReport {
        status: response.status,
        status_text: &response.status_text,
        headers: &response.headers,
        body: response.body_text(),
    };

    serde_json::to_string_pretty(&report).context("Failed to serialize response")
}
