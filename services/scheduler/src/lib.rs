//! dayplan scheduler library.
//!
//! This crate primarily ships a `scheduler` binary, but we expose a small
//! library surface to enable integration testing and reuse.

pub mod api;
pub mod config;
pub mod state;
pub mod store;
