//! Request adapter for mapping HTTP requests to gate inputs.

use std::collections::HashMap;

use super::ExtractCredential;

/// Framework-agnostic view of an inbound request.
///
/// Framework integrations copy the request id, path, headers and cookies
/// into a `RequestAdapter` and hand it to the gate. Header names are
/// case-insensitive; cookie names are not.
///
/// # Examples
///
/// ```
/// use wecare_core::web::{ExtractCredential, RequestAdapter};
///
/// let mut adapter = RequestAdapter::new("req-12345");
/// adapter.set_path("/api/driver/rides");
/// adapter.add_header("AUTHORIZATION", "Bearer abc");
/// adapter.add_cookie_header("theme=dark; token=xyz");
///
/// assert_eq!(adapter.header("authorization"), Some("Bearer abc"));
/// assert_eq!(adapter.cookie("token"), Some("xyz"));
/// assert_eq!(adapter.path(), "/api/driver/rides");
/// ```
#[derive(Debug, Clone)]
pub struct RequestAdapter {
    request_id: String,
    path: String,
    /// Keyed by lowercase header name
    headers: HashMap<String, String>,
    cookies: HashMap<String, String>,
}

impl RequestAdapter {
    /// Creates an adapter for request `request_id` at path `/`.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            path: "/".to_string(),
            headers: HashMap::new(),
            cookies: HashMap::new(),
        }
    }

    /// Sets the request path used for route allow-lists.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    /// Adds a header, replacing any earlier value under the same name.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
    }

    /// Adds a single cookie.
    pub fn add_cookie(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.insert(name.into(), value.into());
    }

    /// Parses a raw `Cookie:` header value (`a=1; b=2`).
    ///
    /// Pairs without `=` are skipped. Surrounding double quotes are removed
    /// from values.
    pub fn add_cookie_header(&mut self, raw: &str) {
        for pair in raw.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            self.cookies.insert(name.to_string(), value.to_string());
        }
    }
}

impl ExtractCredential for RequestAdapter {
    fn request_id(&self) -> &str {
        &self.request_id
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_adapter_is_empty() {
        let adapter = RequestAdapter::new("req-test");
        assert_eq!(adapter.request_id(), "req-test");
        assert_eq!(adapter.path(), "/");
        assert!(adapter.header("authorization").is_none());
        assert!(adapter.cookie("token").is_none());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let mut adapter = RequestAdapter::new("req-1");
        adapter.add_header("Authorization", "Bearer t");

        assert_eq!(adapter.header("authorization"), Some("Bearer t"));
        assert_eq!(adapter.header("AUTHORIZATION"), Some("Bearer t"));
    }

    #[test]
    fn later_header_replaces_earlier() {
        let mut adapter = RequestAdapter::new("req-1");
        adapter.add_header("authorization", "Bearer one");
        adapter.add_header("Authorization", "Bearer two");
        assert_eq!(adapter.header("authorization"), Some("Bearer two"));
    }

    #[test]
    fn cookie_header_parsing() {
        let mut adapter = RequestAdapter::new("req-1");
        adapter.add_cookie_header(" token=\"abc\" ; broken; =nameless; lang=en");

        assert_eq!(adapter.cookie("token"), Some("abc"));
        assert_eq!(adapter.cookie("lang"), Some("en"));
        assert!(adapter.cookie("broken").is_none());
        assert!(adapter.cookie("").is_none());
    }

    #[test]
    fn cookie_names_are_case_sensitive() {
        let mut adapter = RequestAdapter::new("req-1");
        adapter.add_cookie("Token", "abc");
        assert!(adapter.cookie("token").is_none());
    }
}
