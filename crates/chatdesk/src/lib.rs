//! An out-of-the-box chat widget that talks to a hosted chat endpoint.
//!
//! The crate includes a CLI tool for chatting in the terminal. And you can
//! also use it as a library to bring the widget into your own host apps.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod session;

pub use session::SessionBuilder;

/// Re-exports of [`chatdesk_core`] crate.
pub mod core {
    pub use chatdesk_core::*;
}
