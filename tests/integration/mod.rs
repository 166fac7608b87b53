//! Integration tests

mod api;
mod gateway;
