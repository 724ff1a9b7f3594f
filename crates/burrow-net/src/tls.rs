//! TLS provider abstraction.
//!
//! The transport asks a [`TlsProvider`] to wrap a plain [`NetStream`] in a
//! TLS session, so navigation and transport code never depend on a concrete
//! TLS library.

use burrow_types::error::Result;

use crate::stream::NetStream;

/// Provides TLS client connections.
pub trait TlsProvider: Send + Sync {
    /// Wrap `stream` in a TLS client session, performing the handshake.
    ///
    /// `server_name` is used for SNI and certificate verification.
    fn connect_tls(
        &self,
        stream: Box<dyn NetStream>,
        server_name: &str,
    ) -> Result<Box<dyn NetStream>>;
}
