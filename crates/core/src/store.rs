//! The ordered list of messages the widget renders.

use std::fmt::{self, Debug, Display};

use crate::message::{Attachment, Feedback, Message, MessageId, Role};

/// Describes one mutation of a [`ConversationStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreChange {
    /// A message was added to the end of the conversation.
    Appended(MessageId),
    /// Text was appended to an in-flight message. The new text starts at
    /// byte offset `start`.
    TextAppended {
        /// The in-flight message.
        id: MessageId,
        /// Where the appended text begins.
        start: usize,
    },
    /// The whole text of a message was replaced.
    TextReplaced(MessageId),
    /// A message stopped receiving text.
    Finalized(MessageId),
    /// An unfinished message was removed.
    Discarded(MessageId),
    /// The typing indicator was turned on or off.
    TypingChanged(bool),
    /// Feedback was set on a message.
    FeedbackChanged(MessageId),
}

/// Errors returned by store operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreError {
    /// Another reply is already in flight.
    Busy,
    /// No message with the given id exists.
    UnknownMessage(MessageId),
    /// The message is not the one currently in flight.
    NotInFlight(MessageId),
    /// The message is still receiving text.
    NotFinalized(MessageId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Busy => write!(f, "a reply is already in flight"),
            StoreError::UnknownMessage(id) => write!(f, "unknown message {id}"),
            StoreError::NotInFlight(id) => {
                write!(f, "message {id} is not in flight")
            }
            StoreError::NotFinalized(id) => {
                write!(f, "message {id} is not finalized yet")
            }
        }
    }
}

impl std::error::Error for StoreError {}

type Observer = Box<dyn Fn(&ConversationStore, StoreChange) + Send + Sync>;

/// The ordered list of conversation messages, plus the typing indicator.
///
/// At most one assistant message can be in flight at a time. Every
/// mutation is reported to the observer (if any) right after it happened,
/// with the store already in its new state.
#[derive(Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
    in_flight: Option<MessageId>,
    typing: bool,
    observer: Option<Observer>,
}

impl ConversationStore {
    /// Creates an empty store.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store reporting its changes to `observer`.
    #[inline]
    pub fn with_observer(
        observer: impl Fn(&ConversationStore, StoreChange)
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            observer: Some(Box::new(observer)),
            ..Default::default()
        }
    }

    /// Returns all messages in insertion order.
    #[inline]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Looks up a message by id.
    #[inline]
    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Returns the most recent message.
    #[inline]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Returns the number of messages.
    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if there are no messages.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns the id of the message currently receiving a reply.
    #[inline]
    pub fn in_flight(&self) -> Option<MessageId> {
        self.in_flight
    }

    /// Returns whether the "agent is typing" indicator is on.
    #[inline]
    pub fn is_typing(&self) -> bool {
        self.typing
    }

    /// Appends a finalized user message.
    pub fn push_user(
        &mut self,
        text: impl Into<String>,
        attachment: Option<Attachment>,
    ) -> MessageId {
        let mut msg = Message::new(Role::User, text.into());
        msg.attachment = attachment;
        self.push(msg)
    }

    /// Appends a finalized assistant message.
    pub fn push_assistant(&mut self, text: impl Into<String>) -> MessageId {
        self.push(Message::new(Role::Assistant, text.into()))
    }

    /// Starts a new, empty assistant message and marks it in flight.
    pub fn begin_reply(&mut self) -> Result<MessageId, StoreError> {
        if self.in_flight.is_some() {
            return Err(StoreError::Busy);
        }
        let mut msg = Message::new(Role::Assistant, String::new());
        msg.finalized = false;
        let id = msg.id;
        self.in_flight = Some(id);
        self.push(msg);
        Ok(id)
    }

    /// Appends `delta` to the in-flight message.
    pub fn append_reply(
        &mut self,
        id: MessageId,
        delta: &str,
    ) -> Result<(), StoreError> {
        let msg = self.in_flight_mut(id)?;
        let start = msg.text.len();
        msg.text.push_str(delta);
        self.notify(StoreChange::TextAppended { id, start });
        Ok(())
    }

    /// Marks the in-flight message as complete.
    pub fn finalize_reply(&mut self, id: MessageId) -> Result<(), StoreError> {
        self.in_flight_mut(id)?.finalized = true;
        self.in_flight = None;
        self.notify(StoreChange::Finalized(id));
        Ok(())
    }

    /// Replaces the text of the in-flight message and finalizes it.
    pub fn fail_reply(
        &mut self,
        id: MessageId,
        text: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.in_flight_mut(id)?.text = text.into();
        self.notify(StoreChange::TextReplaced(id));
        self.finalize_reply(id)
    }

    /// Removes the in-flight message.
    pub fn discard_reply(&mut self, id: MessageId) -> Result<(), StoreError> {
        self.in_flight_mut(id)?;
        self.messages.retain(|m| m.id != id);
        self.in_flight = None;
        self.notify(StoreChange::Discarded(id));
        Ok(())
    }

    /// Turns the typing indicator on or off. Nothing is reported when the
    /// indicator is already in the requested state.
    pub fn set_typing(&mut self, typing: bool) {
        if self.typing == typing {
            return;
        }
        self.typing = typing;
        self.notify(StoreChange::TypingChanged(typing));
    }

    /// Sets feedback on a finalized message.
    ///
    /// Returns `Ok(false)` without reporting any change if the message
    /// already carries the same feedback.
    pub fn set_feedback(
        &mut self,
        id: MessageId,
        feedback: Feedback,
    ) -> Result<bool, StoreError> {
        let msg = self.get_mut(id)?;
        if !msg.finalized {
            return Err(StoreError::NotFinalized(id));
        }
        if msg.feedback == Some(feedback) {
            return Ok(false);
        }
        msg.feedback = Some(feedback);
        self.notify(StoreChange::FeedbackChanged(id));
        Ok(true)
    }

    pub(crate) fn replace_text(
        &mut self,
        id: MessageId,
        text: impl Into<String>,
    ) -> Result<(), StoreError> {
        let msg = self.get_mut(id)?;
        if !msg.finalized {
            return Err(StoreError::NotFinalized(id));
        }
        msg.text = text.into();
        self.notify(StoreChange::TextReplaced(id));
        Ok(())
    }

    fn push(&mut self, msg: Message) -> MessageId {
        let id = msg.id;
        trace!("appending {:?} message {id}", msg.role);
        self.messages.push(msg);
        self.notify(StoreChange::Appended(id));
        id
    }

    fn get_mut(&mut self, id: MessageId) -> Result<&mut Message, StoreError> {
        self.messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(StoreError::UnknownMessage(id))
    }

    fn in_flight_mut(
        &mut self,
        id: MessageId,
    ) -> Result<&mut Message, StoreError> {
        if self.in_flight != Some(id) {
            return Err(StoreError::NotInFlight(id));
        }
        self.get_mut(id)
    }

    #[inline]
    fn notify(&self, change: StoreChange) {
        if let Some(observer) = &self.observer {
            observer(self, change);
        }
    }
}

impl Debug for ConversationStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationStore")
            .field("messages", &self.messages)
            .field("in_flight", &self.in_flight)
            .field("typing", &self.typing)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn recording_store() -> (ConversationStore, Arc<Mutex<Vec<StoreChange>>>) {
        let changes = Arc::new(Mutex::new(vec![]));
        let store = ConversationStore::with_observer({
            let changes = Arc::clone(&changes);
            move |_, change| changes.lock().unwrap().push(change)
        });
        (store, changes)
    }

    #[test]
    fn test_reply_lifecycle() {
        let (mut store, changes) = recording_store();
        store.push_user("Opening hours?", None);

        let id = store.begin_reply().unwrap();
        assert_eq!(store.in_flight(), Some(id));
        assert!(!store.get(id).unwrap().is_finalized());

        store.append_reply(id, "We're ").unwrap();
        store.append_reply(id, "open").unwrap();
        store.finalize_reply(id).unwrap();

        let msg = store.last().unwrap();
        assert_eq!(msg.text(), "We're open");
        assert_eq!(msg.role(), Role::Assistant);
        assert!(msg.is_finalized());
        assert_eq!(store.in_flight(), None);

        let changes = changes.lock().unwrap();
        assert_eq!(changes[2], StoreChange::TextAppended { id, start: 0 });
        assert_eq!(changes[3], StoreChange::TextAppended { id, start: 6 });
        assert_eq!(changes[4], StoreChange::Finalized(id));
    }

    #[test]
    fn test_one_reply_in_flight() {
        let mut store = ConversationStore::new();
        let id = store.begin_reply().unwrap();
        assert_eq!(store.begin_reply(), Err(StoreError::Busy));

        let other = store.push_assistant("Hello!");
        assert_eq!(
            store.append_reply(other, "x"),
            Err(StoreError::NotInFlight(other))
        );

        store.fail_reply(id, "Sorry").unwrap();
        assert_eq!(store.get(id).unwrap().text(), "Sorry");
        assert!(store.begin_reply().is_ok());
    }

    #[test]
    fn test_discard_reply() {
        let mut store = ConversationStore::new();
        let user = store.push_user("Hi", None);
        let id = store.begin_reply().unwrap();
        store.append_reply(id, "Sure, ").unwrap();
        store.discard_reply(id).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.last().unwrap().id(), user);
        assert_eq!(store.in_flight(), None);
        assert_eq!(
            store.append_reply(id, "more"),
            Err(StoreError::NotInFlight(id))
        );
    }

    #[test]
    fn test_typing_reported_on_change_only() {
        let (mut store, changes) = recording_store();
        store.set_typing(false);
        store.set_typing(true);
        store.set_typing(true);
        store.set_typing(false);
        assert_eq!(
            *changes.lock().unwrap(),
            [
                StoreChange::TypingChanged(true),
                StoreChange::TypingChanged(false)
            ]
        );
    }

    #[test]
    fn test_feedback_is_idempotent() {
        let (mut store, changes) = recording_store();
        let id = store.push_assistant("We're open 9-5.");
        changes.lock().unwrap().clear();

        assert_eq!(store.set_feedback(id, Feedback::Positive), Ok(true));
        assert_eq!(store.set_feedback(id, Feedback::Positive), Ok(false));
        assert_eq!(store.get(id).unwrap().feedback(), Some(Feedback::Positive));
        assert_eq!(
            *changes.lock().unwrap(),
            [StoreChange::FeedbackChanged(id)]
        );

        assert_eq!(store.set_feedback(id, Feedback::Negative), Ok(true));
        assert_eq!(store.get(id).unwrap().feedback(), Some(Feedback::Negative));
    }

    #[test]
    fn test_feedback_requires_finalized() {
        let mut store = ConversationStore::new();
        let id = store.begin_reply().unwrap();
        assert_eq!(
            store.set_feedback(id, Feedback::Positive),
            Err(StoreError::NotFinalized(id))
        );

        store.discard_reply(id).unwrap();
        assert_eq!(
            store.set_feedback(id, Feedback::Positive),
            Err(StoreError::UnknownMessage(id))
        );
    }

    #[test]
    fn test_observer_sees_new_state() {
        let seen = Arc::new(Mutex::new(vec![]));
        let mut store = ConversationStore::with_observer({
            let seen = Arc::clone(&seen);
            move |store, change| {
                if let StoreChange::TextAppended { id, .. } = change {
                    let text = store.get(id).unwrap().text().to_owned();
                    seen.lock().unwrap().push(text);
                }
            }
        });
        let id = store.begin_reply().unwrap();
        store.append_reply(id, "a").unwrap();
        store.append_reply(id, "b").unwrap();
        assert_eq!(*seen.lock().unwrap(), ["a", "ab"]);
    }
}
