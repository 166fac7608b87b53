//! API integration tests
//!
//! Integration tests for the HTTP boundary

mod gateway_test;
