//! Core types and trait definitions for the leads dashboard.
//!
//! No HTTP or terminal dependencies. The report and CLI crates build on it.

#![allow(async_fn_in_trait)]

pub mod backend;
pub mod cache;
pub mod error;
pub mod filter;
pub mod lead;

pub use error::{Error, Result};
