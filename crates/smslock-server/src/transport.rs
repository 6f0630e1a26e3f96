//! Line-delimited TCP serving loop.
//!
//! One connection per client, one spawned task per connection; the only
//! state shared across tasks is the dispatcher (and through it the
//! directory). The remote address serves as the opaque sender context.

use std::sync::Arc;

use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
};

use crate::dispatcher::RequestDispatcher;

/// Accept connections forever, serving each on its own task.
pub async fn serve(
    listener: TcpListener,
    dispatcher: Arc<RequestDispatcher>,
) -> std::io::Result<()> {
    loop {
        let (stream, addr) = listener.accept().await?;
        tracing::debug!(%addr, "connection accepted");

        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move {
            if let Err(err) = serve_connection(stream, &addr.to_string(), &dispatcher).await {
                tracing::warn!(%addr, error = %err, "connection closed with error");
            }
        });
    }
}

async fn serve_connection(
    stream: TcpStream,
    sender: &str,
    dispatcher: &RequestDispatcher,
) -> std::io::Result<()> {
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(response) = dispatcher.handle_line(sender, &line) {
            write.write_all(response.as_bytes()).await?;
            write.write_all(b"\n").await?;
        }
    }

    tracing::debug!(sender, "connection closed");
    Ok(())
}
