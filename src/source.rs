use std::future::Future;
use std::io;

use tokio::io::{AsyncRead, AsyncReadExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Some bytes were placed at the front of the buffer. Zero means "try again".
    Read(usize),
    EndOfStream,
}

/// Anything the request decoder can pull bytes from.
pub trait ByteSource {
    fn read_some<'a>(
        &'a mut self,
        buf: &'a mut [u8],
    ) -> impl Future<Output = io::Result<ReadOutcome>> + Send + 'a;
}

impl<S> ByteSource for S
where
    S: AsyncRead + Unpin + Send,
{
    fn read_some<'a>(
        &'a mut self,
        buf: &'a mut [u8],
    ) -> impl Future<Output = io::Result<ReadOutcome>> + Send + 'a {
        async move {
            match self.read(buf).await {
                Ok(0) if !buf.is_empty() => Ok(ReadOutcome::EndOfStream),
                Ok(n) => Ok(ReadOutcome::Read(n)),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(ReadOutcome::Read(0)),
                Err(e) => Err(e),
            }
        }
    }
}
