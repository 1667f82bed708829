//! Newline-delimited framing over a byte stream.
//!
//! [`FrameBuffer`] is the I/O-free splitter: feed it chunks, take frames out.
//! [`FrameReader`] owns one and refills it from any [`AsyncRead`]. The buffer
//! is never shared, so swapping stdin for an in-memory pipe changes nothing
//! about how frames are cut.
//!
//! Bytes are buffered before UTF-8 decoding, so a multi-byte character split
//! across two reads comes out whole. Blank and whitespace-only lines produce
//! no frame.

use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_stream::Stream;
use tracing::debug;

const READ_CHUNK: usize = 8 * 1024;

/// Accumulates bytes and yields complete, non-blank lines.
///
/// Each byte is searched for a terminator once: `scanned` marks how much
/// of `buf` is known to hold no `\n`.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buf: Vec<u8>,
    scanned: usize,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of input.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Take the next complete frame, without its `\n` terminator.
    ///
    /// Returns `None` when no terminator is buffered yet.
    pub fn next_frame(&mut self) -> Option<String> {
        while let Some(offset) = self.buf[self.scanned..].iter().position(|&b| b == b'\n') {
            let pos = self.scanned + offset;
            let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
            self.scanned = 0;
            line.pop();
            let frame = String::from_utf8_lossy(&line);
            if frame.trim().is_empty() {
                continue;
            }
            return Some(frame.into_owned());
        }
        self.scanned = self.buf.len();
        None
    }

    /// Bytes buffered after the last terminator.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    fn clear(&mut self) {
        self.buf.clear();
        self.scanned = 0;
    }
}

/// Reads frames from an async byte stream.
#[derive(Debug)]
pub struct FrameReader<R> {
    reader: R,
    buffer: FrameBuffer,
    chunk: Box<[u8]>,
    eof: bool,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: FrameBuffer::new(),
            chunk: vec![0u8; READ_CHUNK].into_boxed_slice(),
            eof: false,
        }
    }

    /// Next non-blank frame, or `None` once the stream has ended.
    ///
    /// An unterminated tail at end-of-stream is discarded.
    pub async fn next_frame(&mut self) -> io::Result<Option<String>> {
        loop {
            if let Some(frame) = self.buffer.next_frame() {
                return Ok(Some(frame));
            }
            if self.eof {
                return Ok(None);
            }

            let n = self.reader.read(&mut self.chunk).await?;
            if n == 0 {
                self.eof = true;
                if self.buffer.pending() > 0 {
                    debug!(
                        bytes = self.buffer.pending(),
                        "Discarding unterminated input at end of stream"
                    );
                    self.buffer.clear();
                }
                continue;
            }
            self.buffer.push(&self.chunk[..n]);
        }
    }

    /// The same frames as a stream. The stream ends after the first read error.
    pub fn into_stream(self) -> impl Stream<Item = io::Result<String>> {
        futures::stream::unfold(Some(self), |state| async move {
            let mut reader = state?;
            match reader.next_frame().await {
                Ok(Some(frame)) => Some((Ok(frame), Some(reader))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tokio_test::io::Builder;

    #[test]
    fn buffer_splits_and_drops_blank_lines() {
        let mut buf = FrameBuffer::new();
        buf.push(b"one\n\n   \ntwo\nthr");
        assert_eq!(buf.next_frame().as_deref(), Some("one"));
        assert_eq!(buf.next_frame().as_deref(), Some("two"));
        assert_eq!(buf.next_frame(), None);
        assert_eq!(buf.pending(), 3);

        buf.push(b"ee\n");
        assert_eq!(buf.next_frame().as_deref(), Some("three"));
        assert_eq!(buf.pending(), 0);
    }

    #[test]
    fn buffer_does_not_rescan_pending_bytes() {
        let mut buf = FrameBuffer::new();
        buf.push(b"{\"text_body\":\"");
        assert_eq!(buf.next_frame(), None);
        assert_eq!(buf.scanned, buf.pending());

        buf.push(b"abc");
        assert_eq!(buf.next_frame(), None);
        assert_eq!(buf.scanned, buf.pending());

        buf.push(b"\"}\nnext");
        assert_eq!(buf.next_frame().as_deref(), Some("{\"text_body\":\"abc\"}"));
        assert_eq!(buf.next_frame(), None);
        assert_eq!(buf.scanned, 4);
    }

    #[test]
    fn buffer_keeps_carriage_return() {
        let mut buf = FrameBuffer::new();
        buf.push(b"{\"a\":1}\r\n");
        assert_eq!(buf.next_frame().as_deref(), Some("{\"a\":1}\r"));
    }

    #[tokio::test]
    async fn reassembles_frame_across_reads() {
        let mock = Builder::new()
            .read(b"{\"jsonrpc\":")
            .read(b"\"2.0\"}\n{\"x\"")
            .read(b":1}\n")
            .build();
        let mut reader = FrameReader::new(mock);
        assert_eq!(
            reader.next_frame().await.unwrap().as_deref(),
            Some("{\"jsonrpc\":\"2.0\"}")
        );
        assert_eq!(reader.next_frame().await.unwrap().as_deref(), Some("{\"x\":1}"));
        assert_eq!(reader.next_frame().await.unwrap(), None);
    }

    #[tokio::test]
    async fn multi_megabyte_frame_in_small_reads() {
        let body = "x".repeat(8 * 1024 * 1024);
        let frame = format!("{{\"text_body\":\"{body}\"}}");
        let mut input = frame.clone().into_bytes();
        input.extend_from_slice(b"\n{\"id\":2}\n");

        let mut builder = Builder::new();
        for chunk in input.chunks(READ_CHUNK) {
            builder.read(chunk);
        }
        let mut reader = FrameReader::new(builder.build());

        let started = std::time::Instant::now();
        assert_eq!(reader.next_frame().await.unwrap().as_deref(), Some(frame.as_str()));
        assert_eq!(reader.next_frame().await.unwrap().as_deref(), Some("{\"id\":2}"));
        assert_eq!(reader.next_frame().await.unwrap(), None);
        assert_eq!(reader.buffer.scanned, 0);
        assert!(started.elapsed() < std::time::Duration::from_secs(20));
    }

    #[tokio::test]
    async fn multibyte_char_split_across_reads() {
        // "é" is 0xC3 0xA9
        let mock = Builder::new().read(b"caf\xC3").read(b"\xA9\n").build();
        let mut reader = FrameReader::new(mock);
        assert_eq!(reader.next_frame().await.unwrap().as_deref(), Some("café"));
    }

    #[tokio::test]
    async fn eof_is_clean_and_drops_unterminated_tail() {
        let mock = Builder::new().read(b"done\npartial").build();
        let mut reader = FrameReader::new(mock);
        assert_eq!(reader.next_frame().await.unwrap().as_deref(), Some("done"));
        assert_eq!(reader.next_frame().await.unwrap(), None);
        assert_eq!(reader.next_frame().await.unwrap(), None);
    }

    #[tokio::test]
    async fn read_error_surfaces_once_then_stream_ends() {
        let mock = Builder::new()
            .read(b"a\n")
            .read_error(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
            .build();
        let frames: Vec<_> = FrameReader::new(mock).into_stream().collect().await;
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].as_ref().unwrap(), "a");
        assert_eq!(frames[1].as_ref().unwrap_err().kind(), io::ErrorKind::BrokenPipe);
    }
}
