//! The protocol between the chat widget and its reply backend.
//!
//! This crate establishes how the widget asks the backend for a reply and
//! how the reply flows back: a single request, answered by a stream of raw
//! text chunks. Concrete transports (HTTP, scripted fakes for testing, etc.)
//! implement the traits here, so the widget core never needs to know how the
//! bytes actually travel.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod request;
mod stream;
mod transport;

pub use error::*;
pub use request::*;
pub use stream::*;
pub use transport::*;
