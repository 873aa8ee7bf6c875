use thiserror::Error;
use tracing::{debug, trace};

use crate::http::emitter::ResponseEmitter;
use crate::http::request::Request;
use crate::http::source::{ByteSource, SourceError};

/// Malformed input. Every variant is fatal to the connection.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("request line must have exactly 3 space-separated parts: {line:?}")]
    MalformedRequestLine { line: String },

    #[error("header line does not match `name: value`: {line:?}")]
    MalformedHeader { line: String },

    #[error("invalid Content-Length: {value:?}")]
    InvalidContentLength { value: String },

    #[error("line exceeds {limit} bytes")]
    LineTooLong { limit: usize },

    #[error("more than {limit} headers")]
    TooManyHeaders { limit: usize },

    #[error(transparent)]
    Source(#[from] SourceError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    RequestLine,
    RequestHeaders,
    RequestBody,
    Response,
}

/// Outcome of one [`Parser::advance`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Everything buffered has been consumed; wait for more bytes.
    NeedMore,
    /// A request was completed and answered. More requests may already be
    /// buffered, so call `advance` again.
    Responded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserLimits {
    /// Longest accepted line, delimiter excluded.
    pub max_line_length: usize,
    pub max_content_length: usize,
    /// Distinct header names per request.
    pub max_headers: usize,
}

impl Default for ParserLimits {
    fn default() -> Self {
        Self {
            max_line_length: 8 * 1024,
            max_content_length: 16 * 1024 * 1024,
            max_headers: 64,
        }
    }
}

/// Incremental request parser for one connection.
///
/// Owns its byte source and its response emitter. `advance` only ever looks
/// at what the source has already buffered, so it can be called whenever the
/// transport has delivered new bytes, including zero of them.
#[derive(Debug)]
pub struct Parser<S, E> {
    source: S,
    emitter: E,
    limits: ParserLimits,
    state: ParseState,
    request: Request,
}

impl<S: ByteSource, E: ResponseEmitter> Parser<S, E> {
    pub fn new(source: S, emitter: E) -> Self {
        Self::with_limits(source, emitter, ParserLimits::default())
    }

    pub fn with_limits(source: S, emitter: E, limits: ParserLimits) -> Self {
        Self {
            source,
            emitter,
            limits,
            state: ParseState::RequestLine,
            request: Request::default(),
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// The request accumulated so far.
    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn emitter(&self) -> &E {
        &self.emitter
    }

    pub fn emitter_mut(&mut self) -> &mut E {
        &mut self.emitter
    }

    /// Consumes buffered lines and body bytes until the source runs dry, a
    /// request has been answered, or the input turns out to be malformed.
    pub fn advance(&mut self) -> Result<Progress, ParseError> {
        loop {
            match self.state {
                ParseState::RequestLine | ParseState::RequestHeaders => {
                    if !self.source.has_full_line() {
                        // Leave room for a `\r` whose `\n` has not arrived yet.
                        if self.source.buffered() > self.limits.max_line_length.saturating_add(1) {
                            return Err(ParseError::LineTooLong {
                                limit: self.limits.max_line_length,
                            });
                        }
                        return Ok(Progress::NeedMore);
                    }

                    let raw = self.source.read_line()?;
                    let raw = strip_line_ending(&raw);
                    if raw.len() > self.limits.max_line_length {
                        return Err(ParseError::LineTooLong {
                            limit: self.limits.max_line_length,
                        });
                    }
                    let line = String::from_utf8_lossy(raw);

                    if self.state == ParseState::RequestLine {
                        self.on_request_line(&line)?;
                    } else {
                        self.on_header_line(&line)?;
                    }
                }

                ParseState::RequestBody => {
                    let deficit = self.request.body_deficit();
                    if deficit > 0 {
                        let chunk = self.source.read_up_to(deficit);
                        self.request.body.extend_from_slice(&chunk);
                    }
                    debug_assert!(self.request.body.len() <= self.request.content_length);

                    if self.request.body_deficit() > 0 {
                        return Ok(Progress::NeedMore);
                    }
                    self.state = ParseState::Response;
                }

                ParseState::Response => {
                    debug!(
                        method = %self.request.method,
                        path = %self.request.path,
                        version = %self.request.version,
                        headers = self.request.headers.len(),
                        body_len = self.request.body.len(),
                        "Request complete"
                    );
                    self.emitter.emit(&self.request);
                    self.request.reset();
                    self.state = ParseState::RequestLine;
                    return Ok(Progress::Responded);
                }
            }
        }
    }

    fn on_request_line(&mut self, line: &str) -> Result<(), ParseError> {
        let parts: Vec<&str> = line.split(' ').collect();
        let [method, path, version] = parts.as_slice() else {
            return Err(ParseError::MalformedRequestLine { line: line.to_string() });
        };
        if method.is_empty() || path.is_empty() || version.is_empty() {
            return Err(ParseError::MalformedRequestLine { line: line.to_string() });
        }

        self.request.method = method.to_string();
        self.request.path = path.to_string();
        self.request.version = version.to_string();

        trace!("RequestLine -> RequestHeaders");
        self.state = ParseState::RequestHeaders;
        Ok(())
    }

    fn on_header_line(&mut self, line: &str) -> Result<(), ParseError> {
        if line.is_empty() {
            self.state = if self.request.content_length > 0 {
                ParseState::RequestBody
            } else {
                ParseState::Response
            };
            trace!(next = ?self.state, "headers complete");
            return Ok(());
        }

        let (name, value) = split_header(line)
            .ok_or_else(|| ParseError::MalformedHeader { line: line.to_string() })?;

        if self.request.headers.len() >= self.limits.max_headers
            && !self.request.headers.contains_key(name)
        {
            return Err(ParseError::TooManyHeaders { limit: self.limits.max_headers });
        }

        if name.eq_ignore_ascii_case("Content-Length") {
            self.request.content_length = parse_content_length(value, self.limits.max_content_length)?;
        }
        self.request.set_header(name, value);
        Ok(())
    }
}

/// Drops a trailing `\n`, and the `\r` before it when present.
fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Splits `name: value`: a non-empty name without colons, the colon, at least
/// one space, then everything else as the value.
fn split_header(line: &str) -> Option<(&str, &str)> {
    let (name, rest) = line.split_once(':')?;
    if name.is_empty() {
        return None;
    }
    let value = rest.trim_start_matches(' ');
    if value.len() == rest.len() {
        return None;
    }
    Some((name, value))
}

fn parse_content_length(value: &str, max: usize) -> Result<usize, ParseError> {
    let invalid = || ParseError::InvalidContentLength { value: value.to_string() };

    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let len = value.parse::<usize>().map_err(|_| invalid())?;
    if len > max {
        return Err(invalid());
    }
    Ok(len)
}
