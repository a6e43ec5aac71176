//! Request model and canonical cache-key derivation.
//!
//! A [`FetchRequest`] pairs a URL with its [`FetchOptions`]. Structural
//! equality of requests must imply equality of cache keys, so options keep
//! their headers in a sorted map and the key is derived from a canonical
//! JSON rendering.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FetchError, Result};

/// HTTP method for an upstream request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET (the default).
    #[default]
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
    /// HEAD
    Head,
}

impl HttpMethod {
    /// The method name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for an upstream request.
///
/// Headers live in a `BTreeMap` so the canonical serialization used for
/// cache keys does not depend on insertion order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchOptions {
    /// HTTP method (GET when unspecified).
    #[serde(default)]
    pub method: HttpMethod,
    /// Request headers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// JSON request body, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl FetchOptions {
    /// Creates GET options with no headers or body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method.
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Adds a request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the JSON request body.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A fully specified upstream request.
///
/// Requests that are structurally equal share one [cache key](Self::cache_key)
/// and therefore one cache entry and one in-flight validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Target URL.
    pub url: String,
    /// Request options.
    #[serde(default)]
    pub options: FetchOptions,
}

impl FetchRequest {
    /// Creates a GET request for `url`.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            options: FetchOptions::default(),
        }
    }

    /// Creates a request with explicit options.
    pub fn with_options(url: impl Into<String>, options: FetchOptions) -> Self {
        Self {
            url: url.into(),
            options,
        }
    }

    /// Validates the request shape.
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(FetchError::InvalidRequest("empty URL".into()));
        }
        Ok(())
    }

    /// Derives the cache key identifying this request.
    ///
    /// The key is the URL joined with a canonical JSON rendering of the
    /// options. Keys start with the URL, so whole endpoints can be
    /// invalidated by prefix.
    pub fn cache_key(&self) -> String {
        let options = serde_json::to_string(&self.options).unwrap_or_default();
        format!("{}-{}", self.url, options)
    }
}
