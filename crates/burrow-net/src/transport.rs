//! The one live connection.
//!
//! `Disconnected -> Connected(Plain | Tls) -> Disconnected`. Connecting
//! while already connected first releases the old stream, so there is never
//! more than one socket (or TLS session) alive.

use std::time::Duration;

use burrow_types::error::{BurrowError, Result};
use burrow_types::item::Element;

use crate::stream::{self, NetStream};
use crate::tls::TlsProvider;

enum State {
    Disconnected,
    Connected { stream: Box<dyn NetStream>, tls: bool },
}

pub struct Transport {
    state: State,
    tls_provider: Box<dyn TlsProvider>,
    connect_timeout: Duration,
}

impl Transport {
    pub fn new(tls_provider: Box<dyn TlsProvider>, connect_timeout: Duration) -> Self {
        Transport {
            state: State::Disconnected,
            tls_provider,
            connect_timeout,
        }
    }

    /// Connect to `target`, over TLS when its flag says so.
    ///
    /// `silent` marks automatic probe attempts: failures are logged quietly
    /// instead of at warn level. The returned result is the same either
    /// way. On failure the transport is left disconnected.
    pub fn connect(&mut self, target: &Element, silent: bool) -> Result<()> {
        self.close();

        let result = self.connect_inner(target);
        if let Err(e) = &result {
            if silent {
                log::debug!("probe of {}:{} failed: {e}", target.server, target.port);
            } else {
                log::warn!("connect to {}:{} failed: {e}", target.server, target.port);
            }
        }
        result
    }

    fn connect_inner(&mut self, target: &Element) -> Result<()> {
        let tcp = stream::connect(&target.server, &target.port, self.connect_timeout)?;

        if target.use_tls {
            let tls_stream = self
                .tls_provider
                .connect_tls(Box::new(tcp), &target.server)?;
            log::debug!("TLS session up with {}:{}", target.server, target.port);
            self.state = State::Connected {
                stream: tls_stream,
                tls: true,
            };
        } else {
            self.state = State::Connected {
                stream: Box::new(tcp),
                tls: false,
            };
        }
        Ok(())
    }

    /// Read into `buf`; 0 means end of stream.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match &mut self.state {
            State::Connected { stream, .. } => stream.read(buf),
            State::Disconnected => Err(BurrowError::Connect("not connected".into())),
        }
    }

    /// Write all of `data`, looping over partial writes.
    pub fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let stream = match &mut self.state {
            State::Connected { stream, .. } => stream,
            State::Disconnected => return Err(BurrowError::Connect("not connected".into())),
        };

        let mut rest = data;
        while !rest.is_empty() {
            let n = stream.write(rest)?;
            if n == 0 {
                return Err(BurrowError::Connect("stream closed mid-write".into()));
            }
            rest = &rest[n..];
        }
        Ok(())
    }

    /// Release the live connection, if any. Idempotent.
    pub fn close(&mut self) {
        if let State::Connected { stream, .. } = &mut self.state {
            if let Err(e) = stream.close() {
                log::debug!("close: {e}");
            }
        }
        self.state = State::Disconnected;
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, State::Connected { .. })
    }

    pub fn is_tls(&self) -> bool {
        matches!(self.state, State::Connected { tls: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    /// Hands the plain stream straight back.
    struct PassthroughTlsProvider;

    impl TlsProvider for PassthroughTlsProvider {
        fn connect_tls(
            &self,
            stream: Box<dyn NetStream>,
            _server_name: &str,
        ) -> Result<Box<dyn NetStream>> {
            Ok(stream)
        }
    }

    /// Always refuses the handshake.
    struct FailingTlsProvider;

    impl TlsProvider for FailingTlsProvider {
        fn connect_tls(
            &self,
            _stream: Box<dyn NetStream>,
            server_name: &str,
        ) -> Result<Box<dyn NetStream>> {
            Err(BurrowError::TlsHandshake(format!("{server_name}: refused")))
        }
    }

    fn target(port: u16, use_tls: bool) -> Element {
        use burrow_types::item::ItemType;
        let mut e = Element::new(ItemType::Menu, "test");
        e.server = "127.0.0.1".into();
        e.port = port.to_string();
        e.use_tls = use_tls;
        e
    }

    fn spawn_echo_server() -> (std::thread::JoinHandle<()>, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 256];
            if let Ok(n) = stream.read(&mut buf) {
                let _ = stream.write_all(&buf[..n]);
            }
        });
        (handle, port)
    }

    #[test]
    fn round_trip_over_plain_tcp() {
        let (handle, port) = spawn_echo_server();
        let mut transport = Transport::new(
            Box::new(PassthroughTlsProvider),
            Duration::from_secs(5),
        );

        transport.connect(&target(port, false), false).unwrap();
        assert!(transport.is_connected());
        assert!(!transport.is_tls());

        transport.write_all(b"/selector\r\n").unwrap();
        let mut buf = [0u8; 64];
        let n = transport.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"/selector\r\n");

        transport.close();
        assert!(!transport.is_connected());
        let _ = handle.join();
    }

    #[test]
    fn tls_flag_routes_through_provider() {
        let (handle, port) = spawn_echo_server();
        let mut transport = Transport::new(
            Box::new(PassthroughTlsProvider),
            Duration::from_secs(5),
        );

        transport.connect(&target(port, true), false).unwrap();
        assert!(transport.is_tls());

        transport.close();
        let _ = handle.join();
    }

    #[test]
    fn provider_failure_leaves_disconnected() {
        let (handle, port) = spawn_echo_server();
        let mut transport =
            Transport::new(Box::new(FailingTlsProvider), Duration::from_secs(5));

        let err = transport.connect(&target(port, true), true).unwrap_err();
        assert!(matches!(err, BurrowError::TlsHandshake(_)));
        assert!(!transport.is_connected());

        drop(handle);
    }

    #[test]
    fn reconnect_replaces_the_old_stream() {
        let (h1, p1) = spawn_echo_server();
        let (h2, p2) = spawn_echo_server();
        let mut transport = Transport::new(
            Box::new(PassthroughTlsProvider),
            Duration::from_secs(5),
        );

        transport.connect(&target(p1, false), false).unwrap();
        transport.connect(&target(p2, false), false).unwrap();

        transport.write_all(b"second\r\n").unwrap();
        let mut buf = [0u8; 64];
        let n = transport.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"second\r\n");

        transport.close();
        transport.close();
        let _ = h2.join();
        drop(h1);
    }

    #[test]
    fn io_without_connection_errors() {
        let mut transport = Transport::new(
            Box::new(PassthroughTlsProvider),
            Duration::from_secs(1),
        );
        assert!(transport.read(&mut [0u8; 8]).is_err());
        assert!(transport.write_all(b"x").is_err());
    }
}
