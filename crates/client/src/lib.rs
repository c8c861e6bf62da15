//! `artwatch-client` library crate.
//!
//! Watches a single image-generation job over the server's job-status
//! socket and mirrors its progress into a [`JobView`](view::JobView).
//! The binary entrypoint lives in `main.rs`; the modules are exported for
//! integration testing and for embedding the client in other hosts.

pub mod config;
pub mod controller;
pub mod session;
pub mod socket;
pub mod view;
