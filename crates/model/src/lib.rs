//! A provider-neutral protocol for talking to chat completion backends.
//!
//! This crate establishes the types that the conversation layer uses to
//! interact with a chat completion service, so that the session logic can
//! be exercised against a real HTTP backend or a scripted fake without
//! modifying the core codebase.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod provider;
mod request;
mod response;

pub use error::*;
pub use provider::*;
pub use request::*;
pub use response::*;
