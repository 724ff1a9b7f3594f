//! Pure Gopher codecs.
//!
//! Text in, elements out (and back): no I/O happens in this crate. The URI
//! codec turns location strings into elements and renders them back; the
//! menu codec decodes one response line at a time.

pub mod menu;
pub mod uri;
