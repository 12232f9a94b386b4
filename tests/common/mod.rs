//! Common test utilities and helper modules
//!
//! Mock streams for framing tests, plus helpers that run a real server or a
//! single session handler over loopback TCP.

#![allow(dead_code)]

pub mod mock_streams;
pub mod test_helpers;
