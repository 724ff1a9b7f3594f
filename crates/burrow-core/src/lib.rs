//! Session orchestration for the burrow Gopher client.
//!
//! This crate ties the protocol and transport layers together: a
//! [`session::Session`] owns the current location, the loaded page, the
//! history stack, and the network transport. The [`nav`] module drives
//! fetches (including the TLS upgrade and fallback policy), [`input`]
//! translates keys into actions, and [`search`] runs regex searches over
//! the loaded page. Terminal drawing and process spawning live in the
//! application crate; this crate only talks to them through the traits
//! in [`collab`].

pub mod collab;
pub mod config;
pub mod input;
pub mod nav;
pub mod search;
pub mod session;
