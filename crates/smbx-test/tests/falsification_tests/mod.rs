//! Falsification tests for smbx
//!
//! Each test states a claim about the exporter chain and tries to refute it.
//! A passing test means the claim survived the attempt.
//!
//! - F001-F019: table parsing
//! - F020-F029: aggregation
//! - F030-F039: transport
//! - F040-F049: collector and endpoint

// Allow test-specific patterns that are denied in production code
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(clippy::float_cmp)]

mod aggregate;
mod collector;
mod parser;
mod transport;
