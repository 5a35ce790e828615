use std::time::SystemTime;

use anyhow::Context;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::Headers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok,
    BadRequest,
    InternalServerError,
    HttpVersionNotSupported,
}

impl StatusCode {
    pub fn code(&self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::BadRequest => 400,
            Self::InternalServerError => 500,
            Self::HttpVersionNotSupported => 505,
        }
    }

    pub fn reason_phrase(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::BadRequest => "Bad Request",
            Self::InternalServerError => "Internal Server Error",
            Self::HttpVersionNotSupported => "HTTP Version Not Supported",
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code())
    }
}

/// Headers every response starts with.
pub fn default_headers(content_length: usize) -> Headers {
    let mut headers = Headers::new();
    headers.set("Content-Length", content_length.to_string());
    headers.set("Connection", "close");
    headers.set("Content-Type", "text/plain");
    headers.set("Date", httpdate::fmt_http_date(SystemTime::now()));
    headers
}

/// Serializes a response onto a connection piece by piece.
#[derive(Debug)]
pub struct ResponseWriter<W> {
    socket: W,
}

impl<W: AsyncWrite + Unpin> ResponseWriter<W> {
    pub fn new(socket: W) -> Self {
        Self { socket }
    }

    pub fn into_inner(self) -> W {
        self.socket
    }

    pub async fn status_line(&mut self, status: StatusCode) -> anyhow::Result<()> {
        let msg = format!(
            "HTTP/1.1 {} {}\r\n",
            status.code(),
            status.reason_phrase()
        );
        self.write_str(&msg).await.context("write status line")
    }

    pub async fn header(&mut self, name: &str, value: &str) -> anyhow::Result<()> {
        let msg = format!("{}: {}\r\n", name, value);
        self.write_str(&msg).await.context("write header")
    }

    pub async fn headers(&mut self, headers: &Headers) -> anyhow::Result<()> {
        for (name, value) in headers.iter() {
            self.header(name, value).await?;
        }
        self.headers_end().await
    }

    pub async fn headers_end(&mut self) -> anyhow::Result<()> {
        self.write_str("\r\n").await.context("end of headers")
    }

    pub async fn body(&mut self, body: impl AsRef<[u8]>) -> anyhow::Result<()> {
        self.socket
            .write_all(body.as_ref())
            .await
            .context("write body")
    }

    /// Writes a complete `text/plain` response and flushes it.
    pub async fn respond(&mut self, status: StatusCode, body: &[u8]) -> anyhow::Result<()> {
        self.status_line(status).await?;
        self.headers(&default_headers(body.len())).await?;
        self.body(body).await?;
        self.socket.flush().await.context("flush response")
    }

    async fn write_str(&mut self, data: &str) -> anyhow::Result<()> {
        self.socket
            .write_all(data.as_bytes())
            .await
            .context("write str to socket")
    }
}
