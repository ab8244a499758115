// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query-string preparation applied to every outgoing request URL.

use tracing::warn;
use url::Url;

use trackline_core::TracklineError;

/// Parses `raw` and appends `$top=-1` when no `$top` parameter is present.
///
/// The server applies a small default page size otherwise. A query string
/// longer than `max_query_length` is logged; it is still sent.
pub fn prepare_url(raw: &str, max_query_length: usize) -> Result<Url, TracklineError> {
    let mut url = Url::parse(raw)
        .map_err(|e| TracklineError::Config(format!("invalid request URL `{raw}`: {e}")))?;

    let has_top = url.query_pairs().any(|(key, _)| key == "$top");
    if !has_top {
        let query = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{existing}&$top=-1"),
            _ => "$top=-1".to_string(),
        };
        url.set_query(Some(&query));
    }

    let length = url.query().map_or(0, str::len);
    if length > max_query_length {
        warn!(
            length,
            max = max_query_length,
            path = url.path(),
            "query string exceeds the maximum length"
        );
    }

    Ok(url)
}
