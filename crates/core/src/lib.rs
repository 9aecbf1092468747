//! Core logic including the conversational session, reply extraction and
//! the collection loops built on top of it.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

pub mod chat;
pub mod collect;
pub mod console;
pub mod conversation;
pub mod extract;
mod model_client;
pub mod record;
mod session;
pub mod template;

pub use session::{Session, SessionBuilder};
