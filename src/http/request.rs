//! Incremental request decoding.
//!
//! [`decode`] pulls bytes from a [`ByteSource`] into a [`DecodeBuffer`] and
//! feeds whatever is buffered to the request-line parser, then to the header
//! parser, one line at a time. A parser that cannot find a complete line
//! consumes nothing, which makes the decoder go back to the source for more
//! bytes. Consumed bytes are dropped from the front of the buffer right away,
//! so the buffer only ever holds the unfinished tail of the stream.

use crate::bbuf::DecodeBuffer;
use crate::config::DecoderConfig;
use crate::source::{ByteSource, ReadOutcome};

use super::headers::Headers;
use super::request_line::{parse_request_line, RequestLine};
use super::{ParseError, CRLF};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Init,
    ParsingHeaders,
    Done,
    Error,
}

#[derive(Debug, Clone)]
pub struct Request {
    request_line: RequestLine,
    headers: Headers,
    state: ParserState,
    head_len: usize,
}

impl Request {
    fn new() -> Self {
        Self {
            request_line: RequestLine::default(),
            headers: Headers::new(),
            state: ParserState::Init,
            head_len: 0,
        }
    }

    pub fn request_line(&self) -> &RequestLine {
        &self.request_line
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    fn is_done(&self) -> bool {
        self.state == ParserState::Done
    }

    /// Runs one parser step against `data` and returns how many bytes it took.
    ///
    /// Any error leaves the request in [`ParserState::Error`].
    fn parse_single(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        let result = self.step(data);
        if result.is_err() {
            self.fail();
        }
        result
    }

    fn step(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        match self.state {
            ParserState::Init => match parse_request_line(data)? {
                Some((request_line, n)) => {
                    log::debug!(
                        "request line {} {} HTTP/{}",
                        request_line.method(),
                        request_line.target(),
                        request_line.http_version()
                    );
                    self.request_line = request_line;
                    self.state = ParserState::ParsingHeaders;
                    Ok(n)
                }
                None => Ok(0),
            },
            ParserState::ParsingHeaders => match self.headers.parse(data)? {
                (_, true) => {
                    log::debug!("header section done, {} fields", self.headers.len());
                    self.state = ParserState::Done;
                    Ok(CRLF.len())
                }
                (n, false) => Ok(n),
            },
            ParserState::Done => Ok(0),
            ParserState::Error => Err(ParseError::RequestInErrorState),
        }
    }

    fn fail(&mut self) {
        self.state = ParserState::Error;
    }

    /// Feeds buffered bytes to the parsers until one of them needs more data.
    fn parse(&mut self, buf: &mut DecodeBuffer) -> Result<(), ParseError> {
        while !self.is_done() {
            let n = self.parse_single(buf.buffer())?;
            if n == 0 {
                break;
            }
            buf.consume(n);
            self.head_len += n;
        }
        Ok(())
    }

    /// Bytes of the head seen so far: everything consumed, plus what is still
    /// buffered while the head is unfinished.
    fn head_len(&self, buf: &DecodeBuffer) -> usize {
        if self.is_done() {
            self.head_len
        } else {
            self.head_len + buf.len()
        }
    }
}

/// Decodes one request head using [`DecoderConfig::default`].
pub async fn decode<S: ByteSource>(source: &mut S) -> Result<Request, ParseError> {
    decode_with_config(source, &DecoderConfig::default()).await
}

/// Reads from `source` until the request line and all header fields are parsed.
///
/// Stops reading as soon as the blank line after the headers is consumed.
/// Bytes the source delivered past that point are discarded. A head longer
/// than [`DecoderConfig::max_header_size`] is rejected before it is complete.
pub async fn decode_with_config<S: ByteSource>(
    source: &mut S,
    config: &DecoderConfig,
) -> Result<Request, ParseError> {
    let mut request = Request::new();
    let mut buf = DecodeBuffer::with_capacity(config.initial_buffer_size());

    while !request.is_done() {
        if buf.is_full() {
            if !buf.grow(config.max_header_size()) {
                request.fail();
                return Err(ParseError::RequestHeaderTooLarge(config.max_header_size()));
            }
            log::debug!("decode buffer grown to {} bytes", buf.capacity());
        }

        let n = match source.read_some(buf.spare_mut()).await {
            Ok(ReadOutcome::Read(n)) => n,
            Ok(ReadOutcome::EndOfStream) => {
                let state = request.state();
                request.fail();
                return Err(ParseError::IncompleteRequest {
                    state,
                    unparsed: buf.len(),
                });
            }
            Err(e) => {
                request.fail();
                return Err(e.into());
            }
        };
        if n == 0 {
            tokio::task::yield_now().await;
            continue;
        }
        buf.fill(n);
        log::trace!("read {n} bytes, {} buffered", buf.len());

        request.parse(&mut buf)?;
        if request.head_len(&buf) > config.max_header_size() {
            request.fail();
            return Err(ParseError::RequestHeaderTooLarge(config.max_header_size()));
        }
    }

    if !buf.is_empty() {
        log::debug!("discarding {} bytes after the request head", buf.len());
    }
    Ok(request)
}
