use bytes::{BufMut, BytesMut};
use serde::Deserialize;
use std::fmt;

use crate::http::request::Request;

const DEFAULT_MAX_LINE_LENGTH: usize = 8 * 1024;
const DEFAULT_MAX_BODY_LENGTH: usize = 1024 * 1024;

/// Where the parser is within the request.
///
/// Advances strictly `RequestLine -> Headers -> (Body ->)? Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    RequestLine,
    Headers,
    Body,
    Done,
}

/// Outcome of a successful feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The request is not complete yet; keep feeding.
    NeedMore,
    /// A full request has been recognized.
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The request line was not terminated by CRLF.
    InvalidRequestLine,
    /// A line was not valid UTF-8.
    InvalidEncoding,
    /// A header line had no colon or was not terminated by CRLF.
    InvalidHeader,
    /// The Content-Length value is not a non-negative integer.
    InvalidContentLength,
    /// Body bytes arrived while no body was expected.
    InvalidBodyState,
    /// `feed` was called after completion or after a failure.
    FeedAfterTerminal,
    /// A line grew past `ParserLimits::max_line_length`.
    LineTooLong,
    /// The declared Content-Length exceeds `ParserLimits::max_body_length`.
    BodyTooLarge,
    /// The request was taken before it was complete.
    Incomplete,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ParseError::InvalidRequestLine => "invalid request line",
            ParseError::InvalidEncoding => "line is not valid UTF-8",
            ParseError::InvalidHeader => "invalid header",
            ParseError::InvalidContentLength => "invalid Content-Length",
            ParseError::InvalidBodyState => "body received without Content-Length",
            ParseError::FeedAfterTerminal => "parser already finished",
            ParseError::LineTooLong => "line too long",
            ParseError::BodyTooLarge => "body too large",
            ParseError::Incomplete => "request incomplete",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for ParseError {}

/// Upper bounds on what a single request may make the parser buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParserLimits {
    /// Maximum bytes in one line, CR included.
    pub max_line_length: usize,
    /// Maximum accepted Content-Length.
    pub max_body_length: usize,
}

impl Default for ParserLimits {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            max_body_length: DEFAULT_MAX_BODY_LENGTH,
        }
    }
}

/// Incremental HTTP/1.1 request parser.
///
/// Bytes are fed one at a time (or as slices, which is the same thing) and the
/// parser reports [`Status::Done`] exactly once, when the request line, the
/// header block and `Content-Length` bytes of body have all been seen. Any
/// error poisons the instance; one parser is used per request and then dropped.
///
/// # Example
///
/// ```
/// use trickle::http::parser::{RequestParser, Status};
///
/// let mut parser = RequestParser::new();
/// let (status, used) = parser.feed_slice(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n").unwrap();
/// assert_eq!(status, Status::Done);
/// assert_eq!(used, 27);
///
/// let request = parser.finish().unwrap();
/// assert_eq!(request.request_line, "GET / HTTP/1.1");
/// assert_eq!(request.headers, vec![("Host".to_string(), "x".to_string())]);
/// ```
#[derive(Debug)]
pub struct RequestParser {
    state: ParseState,
    failed: bool,
    limits: ParserLimits,
    line: BytesMut,
    request_line: String,
    headers: Vec<(String, String)>,
    content_length: usize,
    body: BytesMut,
}

impl RequestParser {
    pub fn new() -> Self {
        Self::with_limits(ParserLimits::default())
    }

    pub fn with_limits(limits: ParserLimits) -> Self {
        Self {
            state: ParseState::RequestLine,
            failed: false,
            limits,
            line: BytesMut::new(),
            request_line: String::new(),
            headers: Vec::new(),
            content_length: 0,
            body: BytesMut::new(),
        }
    }

    /// Feeds a single byte.
    pub fn feed(&mut self, byte: u8) -> Result<Status, ParseError> {
        if self.failed {
            return Err(ParseError::FeedAfterTerminal);
        }

        let step = match self.state {
            ParseState::RequestLine => self.feed_request_line(byte),
            ParseState::Headers => self.feed_headers(byte),
            ParseState::Body => self.feed_body(byte),
            ParseState::Done => Err(ParseError::FeedAfterTerminal),
        };

        if let Err(e) = step {
            self.failed = true;
            return Err(e);
        }

        Ok(self.status())
    }

    /// Feeds bytes in order until the request completes or the slice runs out.
    ///
    /// Returns the status and how many bytes were consumed. Bytes after the
    /// end of the request are left untouched for the caller.
    pub fn feed_slice(&mut self, bytes: &[u8]) -> Result<(Status, usize), ParseError> {
        if self.failed || self.state == ParseState::Done {
            self.failed = true;
            return Err(ParseError::FeedAfterTerminal);
        }

        for (i, &byte) in bytes.iter().enumerate() {
            if self.feed(byte)? == Status::Done {
                return Ok((Status::Done, i + 1));
            }
        }

        Ok((Status::NeedMore, bytes.len()))
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == ParseState::Done
    }

    /// The decoded request line, once it has been read.
    pub fn request_line(&self) -> Option<&str> {
        match self.state {
            ParseState::RequestLine => None,
            _ => Some(&self.request_line),
        }
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Value of the last `Content-Length` header seen so far, 0 if none.
    pub fn content_length(&self) -> usize {
        self.content_length
    }

    /// Hands out the parsed request. Fails unless the parser reached `Done`.
    pub fn finish(self) -> Result<Request, ParseError> {
        if self.state != ParseState::Done {
            return Err(ParseError::Incomplete);
        }

        Ok(Request {
            request_line: self.request_line,
            headers: self.headers,
            body: self.body.freeze(),
        })
    }

    fn status(&self) -> Status {
        match self.state {
            ParseState::Done => Status::Done,
            _ => Status::NeedMore,
        }
    }

    /// Accumulates `byte` into the current line. Returns the finished line
    /// (LF excluded, CR kept) when `byte` is the line feed.
    fn take_line(&mut self, byte: u8) -> Result<Option<BytesMut>, ParseError> {
        if byte == b'\n' {
            return Ok(Some(self.line.split()));
        }

        if self.line.len() >= self.limits.max_line_length {
            return Err(ParseError::LineTooLong);
        }

        self.line.put_u8(byte);
        Ok(None)
    }

    fn feed_request_line(&mut self, byte: u8) -> Result<(), ParseError> {
        let Some(line) = self.take_line(byte)? else {
            return Ok(());
        };

        let line = line
            .strip_suffix(b"\r")
            .ok_or(ParseError::InvalidRequestLine)?;
        let text = std::str::from_utf8(line).map_err(|_| ParseError::InvalidEncoding)?;

        self.request_line = text.to_owned();
        self.state = ParseState::Headers;
        Ok(())
    }

    fn feed_headers(&mut self, byte: u8) -> Result<(), ParseError> {
        let Some(line) = self.take_line(byte)? else {
            return Ok(());
        };

        let line = line.strip_suffix(b"\r").ok_or(ParseError::InvalidHeader)?;

        // Blank line ends the header block
        if line.is_empty() {
            if self.content_length > 0 {
                self.body.reserve(self.content_length);
                self.state = ParseState::Body;
            } else {
                self.state = ParseState::Done;
            }
            return Ok(());
        }

        let text = std::str::from_utf8(line).map_err(|_| ParseError::InvalidEncoding)?;
        let (name, value) = text.split_once(':').ok_or(ParseError::InvalidHeader)?;
        let (name, value) = (name.trim(), value.trim());

        if name.eq_ignore_ascii_case("content-length") {
            let length = value
                .parse::<usize>()
                .map_err(|_| ParseError::InvalidContentLength)?;
            if length > self.limits.max_body_length {
                return Err(ParseError::BodyTooLarge);
            }
            self.content_length = length;
        }

        self.headers.push((name.to_owned(), value.to_owned()));
        Ok(())
    }

    fn feed_body(&mut self, byte: u8) -> Result<(), ParseError> {
        if self.content_length == 0 {
            return Err(ParseError::InvalidBodyState);
        }

        self.body.put_u8(byte);
        if self.body.len() >= self.content_length {
            self.state = ParseState::Done;
        }
        Ok(())
    }
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}
