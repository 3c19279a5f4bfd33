//! Salam library exports for the binary and integration tests

pub mod api;
pub mod cli;
pub mod core;
pub mod tui;

#[cfg(test)]
pub mod test_support;
