//! Mock stream implementations for testing framing behavior

use gridlock::messages::{encode, Message};
use std::io::{self, Cursor};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Length-prefix and encode `message`
pub fn frame(message: &Message) -> Vec<u8> {
    let body = encode(message).expect("test message must encode");
    raw_frame(&body)
}

/// Length-prefix arbitrary bytes, valid or not
pub fn raw_frame(body: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(body.len() + 1);
    bytes.push(body.len() as u8);
    bytes.extend_from_slice(body);
    bytes
}

/// Stream that hands out its data at most `chunk` bytes per read
pub struct ChunkedReader {
    data: Cursor<Vec<u8>>,
    chunk: usize,
    reads: usize,
}

impl ChunkedReader {
    pub fn new(data: Vec<u8>, chunk: usize) -> Self {
        Self {
            data: Cursor::new(data),
            chunk,
            reads: 0,
        }
    }

    pub fn read_count(&self) -> usize {
        self.reads
    }
}

impl AsyncRead for ChunkedReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let position = self.data.position() as usize;
        let remaining = &self.data.get_ref()[position..];
        let n = remaining.len().min(self.chunk).min(buf.remaining());
        buf.put_slice(&remaining[..n]);
        self.data.set_position((position + n) as u64);
        if n > 0 {
            self.reads += 1;
        }
        Poll::Ready(Ok(()))
    }
}

/// Stream that never yields data; reads hang until a timeout fires
pub struct StalledStream;

impl AsyncRead for StalledStream {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Pending
    }
}

impl AsyncWrite for StalledStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Pending
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Pending
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
