use bytes::Bytes;

/// Represents a fully parsed HTTP request from a client.
///
/// The request line is kept as the raw decoded text; the method, target and
/// version are only split out on demand and are never validated. Headers keep
/// their original order and duplicates, so they can be echoed back verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The first line of the request, without its trailing CRLF
    pub request_line: String,
    /// Request headers as (name, value) pairs in arrival order
    pub headers: Vec<(String, String)>,
    /// Request body, exactly `Content-Length` bytes
    pub body: Bytes,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    request_line: Option<String>,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            request_line: None,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    pub fn request_line(mut self, line: impl Into<String>) -> Self {
        self.request_line = Some(line.into());
        self
    }

    /// Appends a header. Repeated names are kept.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            request_line: self.request_line.ok_or("request line missing")?,
            headers: self.headers,
            body: self.body,
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    /// First whitespace-separated token of the request line, e.g. `GET`.
    pub fn method(&self) -> Option<&str> {
        self.request_line.split_whitespace().next()
    }

    /// Second token of the request line, e.g. `/index.html`.
    pub fn target(&self) -> Option<&str> {
        self.request_line.split_whitespace().nth(1)
    }

    /// Third token of the request line, e.g. `HTTP/1.1`.
    pub fn version(&self) -> Option<&str> {
        self.request_line.split_whitespace().nth(2)
    }

    /// Retrieves a header value by name, ignoring ASCII case.
    ///
    /// When the header repeats, the last occurrence wins, which is the same
    /// rule the parser applies to `Content-Length`.
    ///
    /// # Example
    ///
    /// ```
    /// # use trickle::http::request::RequestBuilder;
    /// let req = RequestBuilder::new()
    ///     .request_line("GET / HTTP/1.1")
    ///     .header("Accept", "text/html")
    ///     .header("accept", "*/*")
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(req.header("ACCEPT"), Some("*/*"));
    /// ```
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    /// All values of a header, in arrival order.
    pub fn header_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    /// Retrieves the Content-Length header value and parses it as a usize.
    ///
    /// Returns 0 if the header is missing or not a valid number.
    pub fn content_length(&self) -> usize {
        self.header("Content-Length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }
}
