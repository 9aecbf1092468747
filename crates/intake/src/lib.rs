//! Ready-made collection scripts for a local Ollama server.
//!
//! The crate includes the `intake` CLI for using in the terminal. The scripts
//! are also exposed here so host apps can run them with their own
//! [`Console`](intake_core::console::Console).

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

pub mod brief;
pub mod loan;

/// Re-exports of [`intake_core`] crate.
pub mod core {
    pub use intake_core::*;
}
