// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Description of a single request handed to the transport.

use reqwest::Method;
use serde_json::Value;

use trackline_core::RouteTag;

/// What to send and how to treat the response.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// Absolute URL, possibly with a query string.
    pub url: String,
    pub method: Method,
    /// JSON body, if any.
    pub body: Option<Value>,
    /// Requests sharing a tag can be cancelled together.
    pub route_tag: Option<RouteTag>,
    /// When false the body is returned as a JSON string, unparsed.
    pub parse_json: bool,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            body: None,
            route_tag: None,
            parse_json: true,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, url).with_body(body)
    }

    pub fn put(url: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, url).with_body(body)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_route(mut self, route: RouteTag) -> Self {
        self.route_tag = Some(route);
        self
    }

    pub fn raw(mut self) -> Self {
        self.parse_json = false;
        self
    }
}
