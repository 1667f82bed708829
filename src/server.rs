//! The serve loop: frames in, responses out, strictly in order.
//!
//! A frame is read, dispatched to completion (a conversion may take
//! minutes), its response written and flushed, and only then is the next
//! frame read. Responses therefore appear in request order without any
//! bookkeeping, and no two requests are ever in flight together.

use crate::dispatch::Dispatcher;
use crate::frame::FrameReader;
use std::io;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

/// Serve requests from `reader`, writing one line per response to `writer`.
///
/// Returns when the input stream ends.
///
/// # Errors
/// Only I/O errors on the streams themselves. Malformed or failing requests
/// are answered and the loop continues.
pub async fn serve<R, W>(dispatcher: &Dispatcher, reader: R, mut writer: W) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!("Serving MCP requests");
    let mut frames = FrameReader::new(reader);
    let mut handled: u64 = 0;

    while let Some(frame) = frames.next_frame().await? {
        debug!(request = %frame, "Received frame");
        handled += 1;

        let Some(response) = dispatcher.handle_frame(&frame).await else {
            continue;
        };

        let line = response.to_line().map_err(io::Error::other)?;
        debug!(response = %line, "Sending response");
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    info!(frames = handled, "Input closed, shutting down");
    Ok(())
}

/// [`serve`] over the process's stdin and stdout.
pub async fn serve_stdio(dispatcher: &Dispatcher) -> io::Result<()> {
    serve(dispatcher, tokio::io::stdin(), tokio::io::stdout()).await
}
