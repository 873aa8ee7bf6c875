use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tracing::{debug, warn};

use crate::config::Config;
use crate::http::emitter::HtmlEmitter;
use crate::http::parser::{ParseError, ParseState, Parser, Progress};
use crate::http::response::Response;
use crate::http::source::{ByteSource, LineBuffer};
use crate::http::writer::ResponseWriter;

/// Drives one accepted stream: reads bytes into the parser's source, lets the
/// parser answer whatever is complete, and writes the answers back.
pub struct Connection<T> {
    stream: T,
    parser: Parser<LineBuffer, HtmlEmitter>,
    /// Scratch space for socket reads, reused for every read.
    read_buf: Vec<u8>,
    reject_with_bad_request: bool,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Writing(ResponseWriter<Bytes>),
    Closed,
}

impl<T> Connection<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: T, cfg: &Config) -> Self {
        Self {
            stream,
            parser: Parser::with_limits(
                LineBuffer::new(),
                HtmlEmitter::new(),
                cfg.parser.limits(),
            ),
            read_buf: vec![0u8; cfg.server.read_buffer_size.max(1)],
            reject_with_bad_request: cfg.parser.reject_with_bad_request,
            state: ConnectionState::Reading,
        }
    }

    /// Responses produced so far.
    pub fn responses(&self) -> usize {
        self.parser.emitter().emitted()
    }

    /// Runs until the peer disconnects (`Ok`) or sends malformed input
    /// (`Err`). Either way the stream is finished with when this returns.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => {
                    if !self.fill().await? {
                        self.state = ConnectionState::Closed;
                        continue;
                    }

                    if let Err(e) = self.drive() {
                        return Err(self.fail(e).await);
                    }

                    if self.parser.emitter().has_output() {
                        let out = self.parser.emitter_mut().take_output();
                        self.state = ConnectionState::Writing(ResponseWriter::new(out));
                    }
                }

                ConnectionState::Writing(writer) => {
                    writer.write_to_stream(&mut self.stream).await?;
                    self.state = ConnectionState::Reading;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Reads once from the stream. Returns `false` when the peer has closed.
    async fn fill(&mut self) -> anyhow::Result<bool> {
        let n = self.stream.read(&mut self.read_buf).await?;

        if n == 0 {
            let pending = self.parser.state() != ParseState::RequestLine
                || self.parser.source_mut().buffered() > 0;
            if pending {
                debug!(state = ?self.parser.state(), "Peer closed mid-request, discarding it");
            }
            return Ok(false);
        }

        self.parser.source_mut().extend(&self.read_buf[..n]);
        Ok(true)
    }

    /// Lets the parser answer every request that is fully buffered.
    fn drive(&mut self) -> Result<(), ParseError> {
        while self.parser.advance()? == Progress::Responded {}
        Ok(())
    }

    async fn fail(&mut self, err: ParseError) -> anyhow::Error {
        warn!(error = %err, "Malformed request, closing connection");

        // Answers to requests completed before the bad one still go out.
        if self.parser.emitter().has_output() {
            let out = self.parser.emitter_mut().take_output();
            if let Err(e) = ResponseWriter::new(out).write_to_stream(&mut self.stream).await {
                return e;
            }
        }

        if self.reject_with_bad_request {
            let mut writer = ResponseWriter::from_response(&Response::bad_request());
            if let Err(e) = writer.write_to_stream(&mut self.stream).await {
                return e;
            }
        }

        self.state = ConnectionState::Closed;
        anyhow::Error::new(err).context("HTTP parse error")
    }
}
