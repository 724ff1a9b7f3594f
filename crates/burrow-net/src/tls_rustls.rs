//! [`TlsProvider`] backed by rustls + ring.
//!
//! A fresh client configuration is built per connection, so `close` on the
//! transport really does release every TLS resource. Certificate and
//! hostname verification can be switched off for servers with self-signed
//! certificates, which are common in gopherspace.

use std::io::{self, Read, Write};
use std::sync::Arc;

use rustls::ClientConfig;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};

use burrow_types::error::{BurrowError, Result};

use crate::stream::NetStream;
use crate::tls::TlsProvider;

/// rustls-backed TLS connections, with optional verification.
pub struct RustlsTlsProvider {
    insecure: bool,
}

impl RustlsTlsProvider {
    /// `insecure` skips certificate and hostname verification.
    pub fn new(insecure: bool) -> Self {
        RustlsTlsProvider { insecure }
    }

    fn client_config(&self) -> Arc<ClientConfig> {
        let config = if self.insecure {
            ClientConfig::builder()
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(AcceptAnyCert::new()))
                .with_no_client_auth()
        } else {
            let roots =
                rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
            ClientConfig::builder()
                .with_root_certificates(roots)
                .with_no_client_auth()
        };
        Arc::new(config)
    }
}

impl TlsProvider for RustlsTlsProvider {
    fn connect_tls(
        &self,
        stream: Box<dyn NetStream>,
        server_name: &str,
    ) -> Result<Box<dyn NetStream>> {
        let sni = ServerName::try_from(server_name.to_owned())
            .map_err(|e| BurrowError::TlsSetup(format!("invalid server name: {e}")))?;

        let conn = rustls::ClientConnection::new(self.client_config(), sni)
            .map_err(|e| BurrowError::TlsSetup(format!("{server_name}: {e}")))?;

        let stream = RustlsStream::establish(conn, stream)?;
        Ok(Box::new(stream))
    }
}

// ---- certificate verifier for insecure mode ----

/// Accepts every certificate. Signatures are still checked so the session
/// keys are sound; only the trust decision is skipped.
#[derive(Debug)]
struct AcceptAnyCert {
    provider: CryptoProvider,
}

impl AcceptAnyCert {
    fn new() -> Self {
        AcceptAnyCert {
            provider: rustls::crypto::ring::default_provider(),
        }
    }
}

impl ServerCertVerifier for AcceptAnyCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

// ---- TLS-wrapped stream ----

/// A TLS session over an inner [`NetStream`].
///
/// rustls does the crypto; raw I/O is delegated to the inner stream through
/// [`IoAdapter`]. The handshake runs eagerly in [`RustlsStream::establish`]
/// so a returned stream is ready and a certificate problem surfaces as a
/// handshake error, where the fallback policy can see it.
#[derive(Debug)]
struct RustlsStream {
    tls: rustls::ClientConnection,
    inner: Box<dyn NetStream>,
    /// Decrypted by rustls but not yet consumed by the caller.
    plaintext_buf: Vec<u8>,
}

impl RustlsStream {
    fn establish(mut tls: rustls::ClientConnection, mut inner: Box<dyn NetStream>) -> Result<Self> {
        let mut adapter = IoAdapter::new(&mut *inner);
        while tls.is_handshaking() {
            if tls.wants_write() {
                tls.write_tls(&mut adapter)
                    .map_err(|e| BurrowError::TlsHandshake(e.to_string()))?;
            }
            if tls.is_handshaking() && tls.wants_read() {
                match tls.read_tls(&mut adapter) {
                    Ok(0) => {
                        return Err(BurrowError::TlsHandshake(
                            "peer closed during handshake".into(),
                        ));
                    }
                    Ok(_) => {}
                    Err(e) => return Err(BurrowError::TlsHandshake(e.to_string())),
                }
                // Certificate rejection lands here.
                tls.process_new_packets()
                    .map_err(|e| BurrowError::TlsHandshake(e.to_string()))?;
            }
        }
        // Flush whatever handshake bytes remain queued.
        while tls.wants_write() {
            tls.write_tls(&mut adapter)
                .map_err(|e| BurrowError::TlsHandshake(e.to_string()))?;
        }

        Ok(RustlsStream {
            tls,
            inner,
            plaintext_buf: Vec::new(),
        })
    }
}

impl NetStream for RustlsStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        loop {
            if !self.plaintext_buf.is_empty() {
                let n = buf.len().min(self.plaintext_buf.len());
                buf[..n].copy_from_slice(&self.plaintext_buf[..n]);
                self.plaintext_buf.drain(..n);
                return Ok(n);
            }

            // Pull more ciphertext. A would-block here means a record was
            // only partially available; retry in place rather than surface
            // a failure.
            let mut adapter = IoAdapter::new(&mut *self.inner);
            match self.tls.read_tls(&mut adapter) {
                Ok(0) => return Ok(0),
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => continue,
                Err(e) => return Err(BurrowError::Io(e)),
            }

            let state = self
                .tls
                .process_new_packets()
                .map_err(|e| BurrowError::Io(io::Error::other(e.to_string())))?;

            let mut tmp = [0u8; 8192];
            loop {
                match self.tls.reader().read(&mut tmp) {
                    Ok(0) => break,
                    Ok(n) => self.plaintext_buf.extend_from_slice(&tmp[..n]),
                    Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                    Err(e) => return Err(BurrowError::Io(e)),
                }
            }

            if self.plaintext_buf.is_empty() && state.peer_has_closed() {
                return Ok(0);
            }
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let n = self.tls.writer().write(data).map_err(BurrowError::Io)?;

        let mut adapter = IoAdapter::new(&mut *self.inner);
        while self.tls.wants_write() {
            match self.tls.write_tls(&mut adapter) {
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => continue,
                Err(e) => return Err(BurrowError::Io(e)),
            }
        }
        Ok(n)
    }

    fn close(&mut self) -> Result<()> {
        self.tls.send_close_notify();
        let mut adapter = IoAdapter::new(&mut *self.inner);
        let _ = self.tls.write_tls(&mut adapter);
        self.inner.close()
    }
}

// ---- NetStream <-> std::io bridge ----

/// Lets rustls run `io::Read`/`io::Write` against a `&mut dyn NetStream`.
struct IoAdapter<'a> {
    inner: &'a mut dyn NetStream,
}

impl<'a> IoAdapter<'a> {
    fn new(inner: &'a mut dyn NetStream) -> Self {
        IoAdapter { inner }
    }
}

/// I/O errors cross the seam with their kind intact so would-block is
/// still visible to the retry loops above.
fn to_io_error(e: BurrowError) -> io::Error {
    match e {
        BurrowError::Io(io) => io,
        other => io::Error::other(other.to_string()),
    }
}

impl io::Read for IoAdapter<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf).map_err(to_io_error)
    }
}

impl io::Write for IoAdapter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf).map_err(to_io_error)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_is_constructible_both_ways() {
        let _: &dyn TlsProvider = &RustlsTlsProvider::new(false);
        let _: &dyn TlsProvider = &RustlsTlsProvider::new(true);
    }

    #[test]
    fn invalid_server_name_is_setup_error() {
        #[derive(Debug)]
        struct NullStream;
        impl NetStream for NullStream {
            fn read(&mut self, _buf: &mut [u8]) -> Result<usize> {
                Ok(0)
            }
            fn write(&mut self, data: &[u8]) -> Result<usize> {
                Ok(data.len())
            }
            fn close(&mut self) -> Result<()> {
                Ok(())
            }
        }

        let provider = RustlsTlsProvider::new(false);
        let err = provider
            .connect_tls(Box::new(NullStream), "bad name with spaces")
            .unwrap_err();
        assert!(matches!(err, BurrowError::TlsSetup(_)));
    }

    #[test]
    fn handshake_against_non_tls_peer_fails() {
        // A stream that answers the ClientHello with plaintext garbage.
        #[derive(Debug)]
        struct GarbageStream {
            sent: bool,
        }
        impl NetStream for GarbageStream {
            fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
                if self.sent {
                    return Ok(0);
                }
                self.sent = true;
                let junk = b"iThis is not TLS\t\terr.host\t1";
                let n = junk.len().min(buf.len());
                buf[..n].copy_from_slice(&junk[..n]);
                Ok(n)
            }
            fn write(&mut self, data: &[u8]) -> Result<usize> {
                Ok(data.len())
            }
            fn close(&mut self) -> Result<()> {
                Ok(())
            }
        }

        let provider = RustlsTlsProvider::new(true);
        let err = provider
            .connect_tls(Box::new(GarbageStream { sent: false }), "example.com")
            .unwrap_err();
        assert!(matches!(err, BurrowError::TlsHandshake(_)));
    }
}
