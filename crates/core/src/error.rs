use std::fmt::{self, Display};

use crate::hours::InvalidTime;
use crate::message::MessageId;
use crate::store::StoreError;

/// An optional widget feature that the business can switch off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Table booking.
    Booking,
    /// Handing the conversation to a human.
    Escalation,
    /// Rating replies.
    Feedback,
}

impl Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Booking => write!(f, "booking"),
            Feature::Escalation => write!(f, "escalation"),
            Feature::Feedback => write!(f, "feedback"),
        }
    }
}

/// Describes why a widget operation was refused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WidgetError {
    /// A reply is still streaming; the input is locked until it settles.
    Busy,
    /// The feature is switched off in the widget settings.
    Disabled(Feature),
    /// A submitted form is incomplete.
    InvalidForm(&'static str),
    /// The message cannot be rated. Only replies after the welcome message
    /// can.
    NotRateable(MessageId),
    /// The configured business hours cannot be parsed.
    InvalidHours(InvalidTime),
    /// The conversation store refused the operation.
    Store(StoreError),
}

impl Display for WidgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetError::Busy => write!(f, "a reply is still in progress"),
            WidgetError::Disabled(feature) => {
                write!(f, "{feature} is disabled")
            }
            WidgetError::InvalidForm(reason) => {
                write!(f, "invalid form: {reason}")
            }
            WidgetError::NotRateable(id) => {
                write!(f, "message {id} cannot be rated")
            }
            WidgetError::InvalidHours(err) => Display::fmt(err, f),
            WidgetError::Store(err) => Display::fmt(err, f),
        }
    }
}

impl std::error::Error for WidgetError {}

impl From<StoreError> for WidgetError {
    #[inline]
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Busy => WidgetError::Busy,
            err => WidgetError::Store(err),
        }
    }
}

impl From<InvalidTime> for WidgetError {
    #[inline]
    fn from(err: InvalidTime) -> Self {
        WidgetError::InvalidHours(err)
    }
}
