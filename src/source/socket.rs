//! TCP socket source.

use super::stream::{StreamSource, StreamWriter};
use super::{Buffering, PullSource, Pull, Signals, SourceKind};
use crate::error::SourceError;
use std::io::{self, Read};
use std::net::{Shutdown, TcpStream};
use std::thread::{self, JoinHandle};
use tracing::{debug, trace};

/// Bytes requested per socket read (16 KB).
pub const SOCKET_READ_SIZE: usize = 16 * 1024;

/// A TCP stream read on a background thread.
///
/// The thread only moves bytes from the socket into a queue; signalling and
/// pulling happen through the same path as [`StreamSource`]. Destroying the
/// source shuts the socket down and joins the thread, so no handle to the
/// connection survives it.
#[derive(Debug)]
pub struct SocketSource {
    inner: StreamSource,
    stream: Option<TcpStream>,
    reader: Option<JoinHandle<()>>,
}

impl SocketSource {
    pub fn new(stream: TcpStream) -> io::Result<Self> {
        let read_half = stream.try_clone()?;
        let (writer, inner) = StreamSource::pair_with_kind(SourceKind::Socket);
        let reader = thread::Builder::new()
            .name("linewise-socket".to_string())
            .spawn(move || pump_socket(read_half, writer))?;
        Ok(Self {
            inner,
            stream: Some(stream),
            reader: Some(reader),
        })
    }

    pub fn connect(addr: impl std::net::ToSocketAddrs) -> io::Result<Self> {
        Self::new(TcpStream::connect(addr)?)
    }

    /// Bytes received but not yet pulled.
    pub fn remaining(&self) -> Vec<u8> {
        self.inner.remaining()
    }
}

fn pump_socket(mut stream: TcpStream, writer: StreamWriter) {
    let mut buf = vec![0u8; SOCKET_READ_SIZE];
    loop {
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                trace!(bytes = n, "socket chunk");
                writer.write(&buf[..n]);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                writer.fail(SourceError::Io(e));
                break;
            }
        }
    }
    writer.end();
}

impl PullSource for SocketSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Socket
    }

    fn buffering(&self) -> Buffering {
        self.inner.buffering()
    }

    fn pause(&mut self) {
        self.inner.pause();
    }

    fn subscribe(&mut self, signals: Signals) {
        self.inner.subscribe(signals);
    }

    fn unsubscribe(&mut self) {
        self.inner.unsubscribe();
    }

    fn pull(&mut self) -> Result<Pull, SourceError> {
        self.inner.pull()
    }

    fn unshift(&mut self, bytes: Vec<u8>) {
        self.inner.unshift(bytes);
    }

    fn can_destroy(&self) -> bool {
        true
    }

    fn destroy(&mut self) -> Result<(), SourceError> {
        let Some(stream) = self.stream.take() else {
            return Ok(());
        };
        match stream.shutdown(Shutdown::Both) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotConnected => {}
            Err(e) => return Err(SourceError::Io(e)),
        }
        drop(stream);
        if let Some(reader) = self.reader.take() {
            reader
                .join()
                .map_err(|_| SourceError::Other("socket reader thread panicked".to_string()))?;
        }
        self.inner.shut();
        debug!("socket source destroyed");
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::signal_channel;
    use std::io::Write;
    use std::net::TcpListener;
    use std::time::Duration;

    #[test]
    fn test_socket_delivers_then_ends() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let (mut conn, _) = listener.accept().unwrap();
            conn.write_all(b"ping\n").unwrap();
        });

        let mut source = SocketSource::connect(addr).unwrap();
        let (signals, rx) = signal_channel();
        source.subscribe(signals);
        server.join().unwrap();

        let mut received = Vec::new();
        loop {
            rx.recv_timeout(Duration::from_secs(5)).unwrap();
            match source.pull().unwrap() {
                Pull::Chunk(bytes) => received.extend(bytes),
                Pull::End => break,
            }
        }
        assert_eq!(received, b"ping\n".to_vec());
    }

    #[test]
    fn test_destroy_joins_reader() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || listener.accept().unwrap().0);

        let mut source = SocketSource::connect(addr).unwrap();
        let _conn = server.join().unwrap();
        assert!(source.is_open());
        source.destroy().unwrap();
        assert!(!source.is_open());
        assert!(source.reader.is_none());
        assert!(source.buffering().ended);
    }
}
