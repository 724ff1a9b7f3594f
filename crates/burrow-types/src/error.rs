//! Error types for burrow.

use std::io;

/// Errors produced across the burrow crates.
///
/// Parse problems in menu lines never surface here; the codec converts them
/// into synthetic error elements instead. Everything that does reach the
/// caller is either a transport failure (which drives the TLS fallback
/// policy), a rejected user input, or a config/process problem.
#[derive(Debug, thiserror::Error)]
pub enum BurrowError {
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URI: {0}")]
    InvalidUri(String),

    #[error("could not resolve: {0}")]
    Lookup(String),

    #[error("could not connect: {0}")]
    Connect(String),

    #[error("TLS setup failed: {0}")]
    TlsSetup(String),

    #[error("TLS handshake failed: {0}")]
    TlsHandshake(String),

    #[error("no such link: {0}")]
    NoSuchLink(String),

    #[error("bad pattern: {0}")]
    BadPattern(String),

    #[error("no active search")]
    NoActiveSearch,

    #[error("no match")]
    NoMatch,

    #[error("no history")]
    NoHistory,

    #[error("no remote session")]
    NotRemote,

    #[error("not bound")]
    NotBound,

    #[error("process error: {0}")]
    Process(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, BurrowError>;
