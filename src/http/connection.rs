use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::http::parser::{ParseError, ParserLimits, RequestParser, Status};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;

/// Serves exactly one request on a stream, then closes it.
pub struct Connection<S> {
    stream: S,
    buffer: Vec<u8>,
    parser: RequestParser,
    limits: ParserLimits,
    read_timeout: Option<Duration>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Writing(ResponseWriter, Outcome),
    Closed(Outcome),
}

/// How a connection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The request parsed and its headers were echoed with a 200.
    Echoed,
    /// The request was malformed and a 400 was sent.
    Rejected(ParseError),
    /// The peer hung up before sending a full request.
    PeerClosed,
    /// The peer stopped sending for longer than the read timeout.
    TimedOut,
}

enum ReadOutcome {
    Request(Request),
    Malformed(ParseError),
    Closed,
    TimedOut,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, cfg: &Config) -> Self {
        Self {
            stream,
            buffer: vec![0u8; cfg.server.read_buffer_size.max(1)],
            parser: RequestParser::with_limits(cfg.limits),
            limits: cfg.limits,
            read_timeout: cfg.server.read_timeout_ms.map(Duration::from_millis),
            state: ConnectionState::Reading,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<Outcome> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => {
                    self.state = match self.read_request().await? {
                        ReadOutcome::Request(req) => {
                            info!(
                                request_line = %req.request_line,
                                headers = req.headers.len(),
                                body_len = req.body.len(),
                                "Request parsed"
                            );
                            let response = Response::echo_headers(&req);
                            ConnectionState::Writing(ResponseWriter::new(&response), Outcome::Echoed)
                        }
                        ReadOutcome::Malformed(e) => {
                            warn!(error = %e, "Malformed request");
                            let response = Response::bad_request();
                            ConnectionState::Writing(
                                ResponseWriter::new(&response),
                                Outcome::Rejected(e),
                            )
                        }
                        ReadOutcome::Closed => {
                            debug!("Peer closed before a full request arrived");
                            ConnectionState::Closed(Outcome::PeerClosed)
                        }
                        ReadOutcome::TimedOut => {
                            warn!("Timed out waiting for request bytes");
                            ConnectionState::Closed(Outcome::TimedOut)
                        }
                    };
                }

                ConnectionState::Writing(writer, outcome) => {
                    writer.write_to_stream(&mut self.stream).await?;
                    let outcome = outcome.clone();

                    if let Err(e) = self.stream.shutdown().await {
                        debug!(error = %e, "Shutdown after response failed");
                    }
                    self.state = ConnectionState::Closed(outcome);
                }

                ConnectionState::Closed(outcome) => {
                    return Ok(outcome.clone());
                }
            }
        }
    }

    async fn read_request(&mut self) -> anyhow::Result<ReadOutcome> {
        loop {
            let n = match self.read_timeout {
                Some(limit) => match timeout(limit, self.stream.read(&mut self.buffer)).await {
                    Ok(res) => res?,
                    Err(_) => return Ok(ReadOutcome::TimedOut),
                },
                None => self.stream.read(&mut self.buffer).await?,
            };

            if n == 0 {
                return Ok(ReadOutcome::Closed);
            }

            match self.parser.feed_slice(&self.buffer[..n]) {
                Ok((Status::Done, used)) => {
                    if used < n {
                        debug!(discarded = n - used, "Ignoring bytes after the request");
                    }
                    let parser = std::mem::replace(
                        &mut self.parser,
                        RequestParser::with_limits(self.limits),
                    );
                    return Ok(match parser.finish() {
                        Ok(req) => ReadOutcome::Request(req),
                        Err(e) => ReadOutcome::Malformed(e),
                    });
                }
                Ok((Status::NeedMore, _)) => {}
                Err(e) => return Ok(ReadOutcome::Malformed(e)),
            }
        }
    }

    /// Gives the underlying stream back.
    pub fn into_inner(self) -> S {
        self.stream
    }
}
