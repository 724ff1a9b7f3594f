//! Byte-stream seam and the plain TCP implementation.

use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use burrow_types::error::{BurrowError, Result};

/// A bidirectional byte stream the transport can drive.
///
/// Implemented by plain TCP sockets and by TLS sessions wrapping them;
/// tests substitute loopback or pass-through streams.
pub trait NetStream: Send + std::fmt::Debug {
    /// Read into `buf`, returning 0 on end of stream. A socket read
    /// timeout also reads as end of stream; the navigation layer decides
    /// from the protocol terminator whether the transfer was complete.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;
    /// Write from `data`, returning how many bytes were accepted.
    fn write(&mut self, data: &[u8]) -> Result<usize>;
    /// Release the connection. Idempotent.
    fn close(&mut self) -> Result<()>;
}

/// Resolve `server:port` and open a TCP connection with `timeout` applied
/// to both the connect and subsequent reads.
pub fn connect(server: &str, port: &str, timeout: Duration) -> Result<TcpNetStream> {
    let port_num: u16 = port
        .parse()
        .map_err(|_| BurrowError::Lookup(format!("bad port {port:?}")))?;

    let addr = (server, port_num)
        .to_socket_addrs()
        .map_err(|e| BurrowError::Lookup(format!("{server}: {e}")))?
        .next()
        .ok_or_else(|| BurrowError::Lookup(format!("no addresses for {server}")))?;

    let stream = TcpStream::connect_timeout(&addr, timeout)
        .map_err(|e| BurrowError::Connect(format!("{server}:{port_num}: {e}")))?;
    stream.set_read_timeout(Some(timeout))?;

    Ok(TcpNetStream { stream })
}

/// Plain TCP stream.
#[derive(Debug)]
pub struct TcpNetStream {
    stream: TcpStream,
}

impl TcpNetStream {
    pub fn new(stream: TcpStream) -> Self {
        TcpNetStream { stream }
    }
}

impl NetStream for TcpNetStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self.stream.read(buf) {
            Ok(n) => Ok(n),
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                // Read timeout: the server went quiet, treat as EOF.
                Ok(0)
            }
            Err(e) => Err(BurrowError::Io(e)),
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        Ok(self.stream.write(data)?)
    }

    fn close(&mut self) -> Result<()> {
        match self.stream.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            // Already gone: closing twice is fine.
            Err(e) if e.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(BurrowError::Io(e)),
        }
    }
}
