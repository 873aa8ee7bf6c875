use std::collections::HashMap;

/// Header map with case-insensitive names.
///
/// Entries are keyed by the lowercased name and keep the spelling the client
/// used last, so replacing a duplicate is a single lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: HashMap<String, (String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a header; an earlier one with the same name in any case is
    /// replaced, spelling included.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.entries
            .insert(name.to_ascii_lowercase(), (name, value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    /// Name as last written by the client.
    pub fn original_name(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(|(n, _)| n.as_str())
    }

    /// `(name, value)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.values().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.insert(k, v);
        }
        headers
    }
}

/// A request being assembled by the parser, or a completed one handed to the
/// response emitter.
///
/// The same value is reused for every request on a connection: the parser
/// calls [`Request::reset`] once a response has been emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    /// Request method token as sent (e.g. "GET")
    pub method: String,
    /// The request target (e.g. "/index.html")
    pub path: String,
    /// Protocol version token, stored verbatim (e.g. "HTTP/1.1")
    pub version: String,
    /// Request headers, last occurrence of a name wins
    pub headers: Headers,
    /// Declared body length, 0 when no Content-Length was sent
    pub content_length: usize,
    /// Body bytes received so far; never longer than `content_length`
    pub body: Vec<u8>,
}

/// Builder for constructing Request objects.
#[derive(Debug, Default)]
pub struct RequestBuilder {
    method: Option<String>,
    path: Option<String>,
    version: Option<String>,
    headers: Headers,
    body: Vec<u8>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Content length follows the body, whatever the headers say.
    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method.ok_or("method missing")?,
            path: self.path.ok_or("path missing")?,
            version: self.version.unwrap_or_else(|| "HTTP/1.1".to_string()),
            headers: self.headers,
            content_length: self.body.len(),
            body: self.body,
        })
    }
}

impl Request {
    /// Retrieves a header value by name, ignoring ASCII case.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name, value);
    }

    /// Bytes still missing before the body is complete.
    pub fn body_deficit(&self) -> usize {
        self.content_length.saturating_sub(self.body.len())
    }

    /// Clears everything so the value can hold the next request.
    pub fn reset(&mut self) {
        self.method.clear();
        self.path.clear();
        self.version.clear();
        self.headers.clear();
        self.content_length = 0;
        self.body.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.method.is_empty()
            && self.path.is_empty()
            && self.version.is_empty()
            && self.headers.is_empty()
            && self.content_length == 0
            && self.body.is_empty()
    }
}
