// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::crawler::CrawlError;
use crate::services::normalizer::normalize_text;
use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use reqwest::header::CONTENT_TYPE;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::debug;

/// Largest response body read by default: 10 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

static BODY: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body").expect("body selector is valid"));

/// Fetch-parse-normalize pipeline for a single page.
#[derive(Debug, Clone)]
pub struct PageProcessor {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl PageProcessor {
    /// Build a processor whose requests give up after `fetch_timeout`.
    pub fn new(
        fetch_timeout: Duration,
        connect_timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, CrawlError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(fetch_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| CrawlError::StartupFailure(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        })
    }

    /// Fail pages whose body is larger than `max_body_bytes`.
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Fetch `url` and return its normalized visible text.
    pub async fn process(&self, url: &str) -> Result<String, CrawlError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CrawlError::FetchFailure {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::FetchFailure {
                url: url.to_string(),
                reason: format!("HTTP status {status}"),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if let Some(content_type) = content_type.as_deref() {
            if !is_textual(content_type) {
                return Err(CrawlError::ParseFailure {
                    url: url.to_string(),
                    reason: format!("unsupported content type '{content_type}'"),
                });
            }
        }

        let too_large = || CrawlError::FetchFailure {
            url: url.to_string(),
            reason: format!("response body exceeds {} bytes", self.max_body_bytes),
        };
        if response
            .content_length()
            .is_some_and(|len| len > self.max_body_bytes as u64)
        {
            return Err(too_large());
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| CrawlError::FetchFailure {
                url: url.to_string(),
                reason: format!("failed to read body: {e}"),
            })?
        {
            if bytes.len() + chunk.len() > self.max_body_bytes {
                return Err(too_large());
            }
            bytes.extend_from_slice(&chunk);
        }

        let body = decode_body(&bytes, content_type.as_deref());
        let text = extract_visible_text(&body);
        debug!(url, chars = text.len(), "page processed");
        Ok(text)
    }
}

/// Decode with the charset named in the content type, UTF-8 otherwise.
fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(|ct| {
            ct.split(';')
                .filter_map(|param| param.trim().split_once('='))
                .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
                .map(|(_, value)| value.trim().trim_matches('"'))
        })
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);

    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

/// Documents we know how to read as markup. A missing header is given the
/// benefit of the doubt by the caller.
fn is_textual(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime.starts_with("text/")
        || mime == "application/xhtml+xml"
        || mime == "application/xml"
        || mime.ends_with("+xml")
}

/// Collect the text nodes of elements nested inside `<body>`, skipping
/// `style` and `script` contents, and normalize the result.
///
/// Text sitting directly under `<body>` is not part of any nested element
/// and is left out.
pub fn extract_visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let Some(body) = document.select(&BODY).next() else {
        return String::new();
    };

    let mut parts = Vec::new();
    for node in body.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let Some(parent) = node.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        if parent.id() == body.id() || matches!(parent.value().name(), "style" | "script") {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }

    normalize_text(&parts.join(" "))
}
