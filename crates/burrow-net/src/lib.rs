//! Transport layer for burrow.
//!
//! One logical connection at a time, plaintext or TLS. The byte-stream seam
//! is [`NetStream`]; [`TlsProvider`] wraps any such stream in a TLS session
//! so the rest of the client never depends on a concrete TLS library.

pub mod stream;
pub mod tls;
pub mod tls_rustls;
pub mod transport;

pub use stream::{NetStream, TcpNetStream};
pub use tls::TlsProvider;
pub use tls_rustls::RustlsTlsProvider;
pub use transport::Transport;
