
use chatdesk_transport::ChatRequest;
use tokio::select;
use tokio_util::sync::CancellationToken;

use crate::message::MessageId;
use crate::reply_client::ReplyClient;
use crate::store::{ConversationStore, StoreError};

/// The text shown in place of a reply that could not be delivered.
pub const DEFAULT_FAILURE_TEXT: &str =
    "Sorry, I'm having trouble connecting right now. Please try again.";

/// Why a reply could not be delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The backend could not be reached, or it failed before sending any
    /// text.
    TransportUnavailable,
    /// The connection dropped after some text had arrived.
    StreamInterrupted,
}

/// How a reply ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReplyOutcome {
    /// The reply streamed to the end into the given message.
    Completed(MessageId),
    /// The reply failed; the given message now shows the failure text.
    Failed(MessageId, FailureKind),
    /// The caller cancelled the reply. Nothing of it is left in the store.
    Aborted,
}

impl ReplyOutcome {
    /// Returns the message holding the reply, if one is left in the store.
    #[inline]
    pub fn message_id(&self) -> Option<MessageId> {
        match self {
            ReplyOutcome::Completed(id) | ReplyOutcome::Failed(id, _) => {
                Some(*id)
            }
            ReplyOutcome::Aborted => None,
        }
    }
}

/// Turns a streaming reply into one growing assistant message.
///
/// The aggregator is the only writer of the in-flight message while a reply
/// streams. It creates the message lazily on the first piece of text,
/// appends every later chunk to that same message, and finalizes it at the
/// end of the stream. Transport failures replace whatever text arrived with
/// a fixed failure text. No retries are made; resending is up to the user.
#[derive(Clone)]
pub struct ReplyAggregator {
    client: ReplyClient,
    failure_text: String,
}

impl ReplyAggregator {
    /// Creates an aggregator requesting replies through `client`.
    #[inline]
    pub fn new(client: ReplyClient) -> Self {
        Self {
            client,
            failure_text: DEFAULT_FAILURE_TEXT.to_owned(),
        }
    }

    /// Sets the text shown when a reply fails.
    #[inline]
    pub fn with_failure_text<S: Into<String>>(mut self, text: S) -> Self {
        self.set_failure_text(text);
        self
    }

    /// Sets the text shown when a reply fails.
    #[inline]
    pub fn set_failure_text<S: Into<String>>(&mut self, text: S) {
        self.failure_text = text.into();
    }

    /// Returns the text shown when a reply fails.
    #[inline]
    pub fn failure_text(&self) -> &str {
        &self.failure_text
    }

    /// Requests a reply and streams it into `store`.
    ///
    /// The typing indicator is on for as long as this call runs. Returns
    /// [`StoreError::Busy`] without touching the store if another reply is
    /// already in flight.
    ///
    /// # Cancel safety
    ///
    /// Cancelling `cancel` is observed while waiting for the backend and at
    /// every chunk boundary. The partial message is then discarded, the
    /// typing indicator is cleared and the store is not touched again.
    /// Dropping the returned future has the same effect.
    pub async fn stream_reply(
        &self,
        store: &mut ConversationStore,
        request: ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<ReplyOutcome, StoreError> {
        if store.in_flight().is_some() {
            return Err(StoreError::Busy);
        }

        let mut reply = PendingReply::new(store);
        reply.store.set_typing(true);

        let send_fut = self.client.send_request(request);
        let mut chunks = select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("reply cancelled before the backend answered");
                return Ok(reply.abort());
            }
            result = send_fut => match result {
                Ok(chunks) => chunks,
                Err(err) => {
                    warn!("backend unavailable: {err}");
                    return reply.fail(
                        &self.failure_text,
                        FailureKind::TransportUnavailable,
                    );
                }
            },
        };

        loop {
            let chunk = select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("reply cancelled after {} bytes", reply.received);
                    return Ok(reply.abort());
                }
                chunk = chunks.next_chunk() => chunk,
            };

            match chunk {
                Ok(Some(text)) => reply.append(&text)?,
                Ok(None) => return reply.complete(&self.failure_text),
                Err(err) => {
                    // Whatever arrived so far is dropped in favor of the
                    // failure text.
                    let kind = if reply.id.is_some() {
                        FailureKind::StreamInterrupted
                    } else {
                        FailureKind::TransportUnavailable
                    };
                    warn!("reply failed after {} bytes: {err}", reply.received);
                    return reply.fail(&self.failure_text, kind);
                }
            }
        }
    }
}

/// The in-flight state of one reply.
///
/// Dropping an unsettled reply discards its message and clears the typing
/// indicator, so an abandoned `stream_reply` never leaves a stuck message
/// behind.
struct PendingReply<'a> {
    store: &'a mut ConversationStore,
    id: Option<MessageId>,
    received: usize,
    settled: bool,
}

impl<'a> PendingReply<'a> {
    #[inline]
    fn new(store: &'a mut ConversationStore) -> Self {
        Self {
            store,
            id: None,
            received: 0,
            settled: false,
        }
    }

    fn append(&mut self, text: &str) -> Result<(), StoreError> {
        if text.is_empty() {
            return Ok(());
        }
        let id = match self.id {
            Some(id) => id,
            None => {
                let id = self.store.begin_reply()?;
                debug!("first text arrived, created message {id}");
                self.id = Some(id);
                id
            }
        };
        trace!("appending {} bytes to {id}", text.len());
        self.received += text.len();
        self.store.append_reply(id, text)
    }

    fn complete(
        mut self,
        failure_text: &str,
    ) -> Result<ReplyOutcome, StoreError> {
        let Some(id) = self.id else {
            // An empty reply is as useless as no reply.
            warn!("reply ended without any text");
            return self.fail(failure_text, FailureKind::TransportUnavailable);
        };
        self.store.finalize_reply(id)?;
        self.store.set_typing(false);
        self.settled = true;
        debug!("reply {id} completed with {} bytes", self.received);
        Ok(ReplyOutcome::Completed(id))
    }

    fn fail(
        mut self,
        failure_text: &str,
        kind: FailureKind,
    ) -> Result<ReplyOutcome, StoreError> {
        let id = match self.id {
            Some(id) => id,
            None => {
                let id = self.store.begin_reply()?;
                self.id = Some(id);
                id
            }
        };
        self.store.fail_reply(id, failure_text)?;
        self.store.set_typing(false);
        self.settled = true;
        Ok(ReplyOutcome::Failed(id, kind))
    }

    fn abort(mut self) -> ReplyOutcome {
        self.discard();
        ReplyOutcome::Aborted
    }

    fn discard(&mut self) {
        self.settled = true;
        if let Some(id) = self.id.take() {
            if let Err(err) = self.store.discard_reply(id) {
                error!("failed to discard reply {id}: {err}");
            }
        }
        self.store.set_typing(false);
    }
}

impl Drop for PendingReply<'_> {
    fn drop(&mut self) {
        if !self.settled {
            debug!("reply abandoned before it settled");
            self.discard();
        }
    }
}
