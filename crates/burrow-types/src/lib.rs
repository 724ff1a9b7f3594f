//! Foundation types for burrow.
//!
//! This crate contains the platform-agnostic core types shared by all burrow
//! crates: Gopher item types and elements, the page/history containers, key
//! events, and error types.

pub mod error;
pub mod input;
pub mod item;
pub mod page;
