use bytes::{Bytes, BytesMut};

use crate::http::page;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::serialize_response;

/// Receives each completed request exactly once, synchronously, from the
/// parser.
pub trait ResponseEmitter {
    fn emit(&mut self, request: &Request);
}

impl<F> ResponseEmitter for F
where
    F: FnMut(&Request),
{
    fn emit(&mut self, request: &Request) {
        self(request)
    }
}

/// Answers every request with the HTML echo page.
///
/// Serialized responses pile up in an outbound buffer until the connection
/// takes them with [`HtmlEmitter::take_output`] and writes them in one go.
#[derive(Debug, Default)]
pub struct HtmlEmitter {
    out: BytesMut,
    emitted: usize,
}

impl HtmlEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_output(&mut self) -> Bytes {
        self.out.split().freeze()
    }

    pub fn has_output(&self) -> bool {
        !self.out.is_empty()
    }

    /// Number of responses produced over the connection's lifetime.
    pub fn emitted(&self) -> usize {
        self.emitted
    }
}

impl ResponseEmitter for HtmlEmitter {
    fn emit(&mut self, request: &Request) {
        let response = Response::html(page::render(request));
        self.out.extend_from_slice(&serialize_response(&response));
        self.emitted += 1;
    }
}
