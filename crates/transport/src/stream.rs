use std::pin::Pin;
use std::task::{self, Poll};

use crate::transport::TransportError;

/// A streaming reply from the backend.
///
/// The reply is plain text without any framing, split into chunks at
/// arbitrary points. Chunk boundaries carry no meaning: they don't have to
/// align with words, sentences, or even UTF-8 code points on the wire. It's
/// the implementor's job to only ever hand out complete, decoded text.
pub trait ReplyStream: Sized + Send + 'static {
    /// The error type that may be returned by the stream.
    type Error: TransportError;

    /// Attempts to pull out the next text chunk from the reply.
    ///
    /// # Return value
    ///
    /// There are several possible return values, each indicating a
    /// distinct stream state:
    ///
    /// - `Poll::Pending` means that this stream is still waiting for the
    ///   next chunk. Implementations will ensure that the current task
    ///   will be notified when the next chunk may be ready.
    /// - `Poll::Ready(Ok(Some(chunk)))` means the stream has a chunk to
    ///   deliver, and may produce further chunks on subsequent
    ///   `poll_next_chunk` calls. The chunk may be empty.
    /// - `Poll::Ready(Ok(None))` means the reply has completed.
    /// - `Poll::Ready(Err(error))` means an error occurred while reading
    ///   the reply. The stream should not be polled again.
    ///
    /// Calling this method after completion should always return `None`.
    fn poll_next_chunk(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<String>, Self::Error>>;
}
