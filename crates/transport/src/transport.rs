use std::error::Error;

use crate::error::ErrorKind;
use crate::request::ChatRequest;
use crate::stream::ReplyStream;

/// The error type for a chat transport.
pub trait TransportError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type that carries a [`ChatRequest`] to the reply backend and hands
/// back the streaming reply.
///
/// Once the transport is created, it should behave like a stateless object.
/// It can still have internal state, but callers should not rely on it,
/// and the transport should be prepared for being dropped anytime.
pub trait ChatTransport: Send + Sync {
    /// The error type that may be returned by the transport.
    type Error: TransportError;

    /// The reply stream type for this transport.
    type Stream: ReplyStream<Error = Self::Error>;

    /// Sends a request to the backend.
    ///
    /// The returned future resolves once the backend has accepted the
    /// request and the reply body is ready to be streamed. Dropping the
    /// future (or the stream) aborts the exchange.
    fn send_request(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<Self::Stream, Self::Error>> + Send + 'static;
}
