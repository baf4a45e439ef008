//! src/net.rs
//!
//! Remote control over TCP.

pub mod remote;
