//! Terminal dashboard and command-line tools for the leads backend.
//!
//! The binary (`leads`) wires these modules together; they live in a library
//! so the HTTP client, search engine and application state can be tested
//! without a terminal.

pub mod app;
pub mod client;
pub mod config;
pub mod export;
pub mod search;
pub mod token;
pub mod ui;

#[cfg(test)]
pub(crate) mod test_support;
