//! Core logic of the chat widget: the conversation store, the streaming
//! reply aggregator, localization, business hours and settings.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod aggregator;
pub mod config;
mod error;
mod hours;
pub mod i18n;
mod message;
mod reply_client;
pub mod settings;
mod store;
mod widget;

pub use aggregator::{
    DEFAULT_FAILURE_TEXT, FailureKind, ReplyAggregator, ReplyOutcome,
};
pub use error::{Feature, WidgetError};
pub use hours::{BusinessHours, InvalidTime};
pub use message::{Attachment, Feedback, Message, MessageId, Role};
pub use reply_client::{ReplyChunks, ReplyClient};
pub use store::{ConversationStore, StoreChange, StoreError};
pub use widget::{
    BookingRequest, CustomerInfo, OfflineNotice, QuickReplyAction,
    SendOutcome, Widget, WidgetBuilder,
};
