// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rewrites server-relative URLs in JSON payloads to absolute ones.
//!
//! The server returns avatar and attachment links as paths such as
//! `/hub/api/rest/avatar/123`. Those are resolved against the origin of the
//! backend URL, so a backend with a context path (`https://host/youtrack`)
//! still produces `https://host/hub/...`.

use serde_json::Value;
use url::Url;

/// Fields holding user-authored links: attachment links and avatars.
pub const ATTACHMENT_URL_FIELDS: [&str; 3] = ["url", "thumbnailURL", "avatarUrl"];

/// Recursively rewrites every string under `field` that starts with `/`.
///
/// Absolute values and other fields are left untouched at any depth.
/// Applying it twice yields the same result as applying it once.
pub fn normalize(payload: Value, field: &str, base: &str) -> Value {
    normalize_fields(payload, &[field], base)
}

/// Like [`normalize`] for several field names in one pass.
pub fn normalize_fields(payload: Value, fields: &[&str], base: &str) -> Value {
    let origin = origin_of(base);
    rewrite(payload, fields, &origin)
}

fn rewrite(value: Value, fields: &[&str], origin: &str) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| rewrite(item, fields, origin))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    let value = match value {
                        Value::String(s) if fields.contains(&key.as_str()) => {
                            Value::String(join(origin, &s))
                        }
                        other => rewrite(other, fields, origin),
                    };
                    (key, value)
                })
                .collect(),
        ),
        other => other,
    }
}

/// Resolves a single value against `base`. Non-relative values are returned
/// as they are.
pub fn absolute_url(value: &str, base: &str) -> String {
    join(&origin_of(base), value)
}

fn join(origin: &str, value: &str) -> String {
    if is_relative(value) {
        format!("{origin}{value}")
    } else {
        value.to_string()
    }
}

fn is_relative(value: &str) -> bool {
    value.starts_with('/') && !value.starts_with("//")
}

/// `scheme://host[:port]` of `base`, or `base` without a trailing slash when
/// it does not parse.
fn origin_of(base: &str) -> String {
    match Url::parse(base) {
        Ok(url) if url.has_host() => url.origin().ascii_serialization(),
        _ => base.trim_end_matches('/').to_string(),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn rewrites_nested_avatar() {
        let payload = json!({
            "id": "test-id",
            "comments": [
                {"author": {"avatarUrl": "/hub/users/123", "login": "/not-a-url-field"}}
            ]
        });
        let normalized = normalize(payload, "avatarUrl", "http://foo.bar");
        assert_eq!(
            normalized["comments"][0]["author"]["avatarUrl"],
            "http://foo.bar/hub/users/123"
        );
        assert_eq!(
            normalized["comments"][0]["author"]["login"],
            "/not-a-url-field"
        );
    }

    #[test]
    fn context_path_is_dropped() {
        assert_eq!(
            absolute_url("/hub/api/rest/avatar/1", "https://host.example.com/youtrack/"),
            "https://host.example.com/hub/api/rest/avatar/1"
        );
        assert_eq!(
            absolute_url("/files/a.png", "http://localhost:8080/youtrack"),
            "http://localhost:8080/files/a.png"
        );
    }

    #[test]
    fn absolute_and_protocol_relative_values_are_kept() {
        assert_eq!(
            absolute_url("https://cdn.example.com/a.png", "http://foo.bar"),
            "https://cdn.example.com/a.png"
        );
        assert_eq!(
            absolute_url("//cdn.example.com/a.png", "http://foo.bar"),
            "//cdn.example.com/a.png"
        );
    }

    #[test]
    fn rewrites_all_attachment_fields() {
        let payload = json!({
            "attachments": [{"url": "/a", "thumbnailURL": "/t", "name": "/n"}]
        });
        let normalized = normalize_fields(payload, &ATTACHMENT_URL_FIELDS, "http://foo.bar");
        assert_eq!(normalized["attachments"][0]["url"], "http://foo.bar/a");
        assert_eq!(normalized["attachments"][0]["thumbnailURL"], "http://foo.bar/t");
        assert_eq!(normalized["attachments"][0]["name"], "/n");
    }

    fn json_leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(Value::from),
            "(/|https?://h/|)[a-z0-9/]{0,8}".prop_map(Value::String),
        ]
    }

    fn json_tree() -> impl Strategy<Value = Value> {
        json_leaf().prop_recursive(4, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::vec(
                    (prop_oneof![Just("url".to_string()), Just("name".to_string()), Just("avatarUrl".to_string())], inner),
                    0..4
                )
                .prop_map(|pairs| Value::Object(pairs.into_iter().collect())),
            ]
        })
    }

    /// Walks both trees in parallel and checks that only relative strings
    /// under `field` changed.
    fn only_field_changed(before: &Value, after: &Value, field: &str, key: Option<&str>) -> bool {
        match (before, after) {
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| only_field_changed(x, y, field, None))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, v)| {
                        b.get(k)
                            .is_some_and(|w| only_field_changed(v, w, field, Some(k)))
                    })
            }
            (Value::String(a), Value::String(b)) if key == Some(field) && is_relative(a) => {
                *b == format!("http://foo.bar{a}")
            }
            (a, b) => a == b,
        }
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(payload in json_tree()) {
            let once = normalize(payload, "url", "http://foo.bar/ctx");
            let twice = normalize(once.clone(), "url", "http://foo.bar/ctx");
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn normalization_only_touches_relative_field_values(payload in json_tree()) {
            let after = normalize(payload.clone(), "url", "http://foo.bar");
            prop_assert!(only_field_changed(&payload, &after, "url", None));
        }
    }
}
