//! Blocking message-oriented carrier boundary.
//!
//! The protocol core never opens sockets or formats SMS payloads; it hands
//! serialized lines to a [`Transport`] and blocks on its inbound side. Two
//! implementations ship here: an in-process pair for tests and simulations,
//! and a blocking TCP line carrier for talking to the demo server.

use std::{
    io::{BufRead, BufReader, Write},
    net::TcpStream,
    sync::mpsc::{Receiver, Sender, channel},
};

use thiserror::Error;

/// Errors from the carrier.
#[derive(Error, Debug)]
pub enum TransportError {
    /// I/O failure in the underlying carrier.
    #[error("transport i/o: {0}")]
    Io(#[from] std::io::Error),

    /// The carrier is closed; no further messages will arrive.
    #[error("transport closed")]
    Closed,
}

/// Reliable, message-oriented, blocking carrier.
///
/// `destination` is whatever addresses a peer on this carrier (a phone
/// number for SMS); point-to-point links ignore it. Neither call retries or
/// times out internally; failures surface to the protocol layer untouched.
pub trait Transport {
    /// Deliver one serialized line to `destination`.
    fn send(&mut self, destination: &str, line: &str) -> Result<(), TransportError>;

    /// Block until the next inbound line arrives.
    fn receive(&mut self) -> Result<String, TransportError>;
}

/// In-process carrier: one endpoint of a connected pair.
pub struct InMemoryTransport {
    tx: Sender<String>,
    rx: Receiver<String>,
}

impl InMemoryTransport {
    /// Create a connected pair; lines sent on either side arrive on the
    /// other, in send order.
    pub fn pair() -> (Self, Self) {
        let (left_tx, right_rx) = channel();
        let (right_tx, left_rx) = channel();
        (Self { tx: left_tx, rx: left_rx }, Self { tx: right_tx, rx: right_rx })
    }
}

impl Transport for InMemoryTransport {
    fn send(&mut self, _destination: &str, line: &str) -> Result<(), TransportError> {
        self.tx.send(line.to_string()).map_err(|_| TransportError::Closed)
    }

    fn receive(&mut self) -> Result<String, TransportError> {
        self.rx.recv().map_err(|_| TransportError::Closed)
    }
}

/// Blocking TCP line carrier (point-to-point, so destination is ignored).
pub struct TcpLineTransport {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl TcpLineTransport {
    /// Connect to the server at `addr`.
    pub fn connect(addr: &str) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr)?;
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self { reader, writer: stream })
    }
}

impl Transport for TcpLineTransport {
    fn send(&mut self, _destination: &str, line: &str) -> Result<(), TransportError> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    fn receive(&mut self) -> Result<String, TransportError> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line)?;
        if read == 0 {
            return Err(TransportError::Closed);
        }
        Ok(line.trim_end().to_string())
    }
}
