//! HTTP/1.x request parsing and responding.
//!
//! # Architecture
//!
//! - **`source`**: buffered bytes of one connection, handed out as lines or
//!   body runs
//! - **`request`**: the request being accumulated
//! - **`parser`**: the incremental state machine that fills the request
//! - **`emitter`**: receives each completed request and produces the answer
//! - **`page`**: the HTML echo page
//! - **`response`** / **`writer`**: response representation and serialization
//! - **`connection`**: tokio driver tying a stream to one parser
//!
//! # Parser State Machine
//!
//! ```text
//!        ┌─────────────────┐
//!   ┌───►│   RequestLine   │ ← METHOD SP PATH SP VERSION
//!   │    └────────┬────────┘
//!   │             ▼
//!   │    ┌─────────────────┐
//!   │    │ RequestHeaders  │ ← `Name: value` until an empty line
//!   │    └────────┬────────┘
//!   │             │ Content-Length > 0
//!   │             ▼
//!   │    ┌─────────────────┐
//!   │    │   RequestBody   │ ← exactly Content-Length bytes
//!   │    └────────┬────────┘
//!   │             ▼
//!   │    ┌─────────────────┐
//!   └────┤    Response     │ ← emit, then reset the request
//!        └─────────────────┘
//! ```
//!
//! Malformed input at any step ends the connection.
//!
//! # Example
//!
//! ```
//! use reqecho::http::emitter::HtmlEmitter;
//! use reqecho::http::parser::{Parser, Progress};
//! use reqecho::http::source::LineBuffer;
//!
//! let mut parser = Parser::new(LineBuffer::new(), HtmlEmitter::new());
//! parser.source_mut().extend(b"GET / HTTP/1.1\r\nHost: a\r\n\r\n");
//!
//! assert_eq!(parser.advance().unwrap(), Progress::Responded);
//! assert!(parser.emitter_mut().take_output().starts_with(b"HTTP/1.1 200 OK\r\n"));
//! ```

pub mod connection;
pub mod emitter;
pub mod page;
pub mod parser;
pub mod request;
pub mod response;
pub mod source;
pub mod writer;
