//! Falsification tests for smbx
//!
//! Each test states a claim about the exporter chain and tries to refute it.
//! A passing test means the claim survived the attempt.

mod falsification_tests;
