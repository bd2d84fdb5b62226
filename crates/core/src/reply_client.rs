use std::future::poll_fn;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use chatdesk_transport::{
    ChatRequest, ChatTransport, ReplyStream, TransportError,
};
use tracing::Instrument;

type SendRequestResult = Result<ReplyChunks, Box<dyn TransportError>>;
type BoxedSendRequestFuture =
    Pin<Box<dyn Future<Output = SendRequestResult> + Send>>;
type HandlerFn =
    Arc<dyn Fn(ChatRequest) -> BoxedSendRequestFuture + Send + Sync>;

/// A wrapper around a chat transport that provides a type-erased interface
/// for the other modules.
#[derive(Clone)]
pub struct ReplyClient {
    handler_fn: HandlerFn,
}

impl ReplyClient {
    /// Wraps a transport.
    #[inline]
    pub fn new<T: ChatTransport + 'static>(transport: T) -> Self {
        // We have to erase the type `T`, since `ReplyClient` doesn't have a
        // generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |req: ChatRequest| {
            let fut = transport.send_request(&req);
            let fut: BoxedSendRequestFuture = Box::pin(
                async move {
                    trace!("sending a request: {:?}", req);
                    match fut.await {
                        Ok(stream) => Ok(ReplyChunks(Box::pin(stream))),
                        Err(err) => {
                            warn!("request failed: {err}");
                            Err(Box::new(err) as Box<dyn TransportError>)
                        }
                    }
                }
                .instrument(trace_span!("reply client req")),
            );
            fut
        });
        Self { handler_fn }
    }

    /// Sends a request and returns the reply stream once the backend has
    /// accepted it.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe. Dropping the future aborts the request.
    #[inline]
    pub async fn send_request(&self, req: ChatRequest) -> SendRequestResult {
        (self.handler_fn)(req).await
    }
}

trait ErasedReplyStream: Send {
    fn poll_next_chunk(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<String>, Box<dyn TransportError>>>;
}

impl<S: ReplyStream> ErasedReplyStream for S {
    #[inline]
    fn poll_next_chunk(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<String>, Box<dyn TransportError>>> {
        ReplyStream::poll_next_chunk(self, cx)
            .map_err(|err| Box::new(err) as Box<dyn TransportError>)
    }
}

/// The text chunks of a reply, in arrival order.
pub struct ReplyChunks(Pin<Box<dyn ErasedReplyStream>>);

impl ReplyChunks {
    /// Waits for the next chunk. `Ok(None)` marks the end of the reply.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe. A chunk is never lost when the returned
    /// future is dropped before completion.
    #[inline]
    pub async fn next_chunk(
        &mut self,
    ) -> Result<Option<String>, Box<dyn TransportError>> {
        poll_fn(|cx| self.0.as_mut().poll_next_chunk(cx)).await
    }
}

#[cfg(test)]
mod tests {
    use chatdesk_test_transport::{PresetEnding, PresetReply, TestTransport};
    use chatdesk_transport::ErrorKind;

    use super::*;

    async fn collect(
        chunks: &mut ReplyChunks,
    ) -> Result<Vec<String>, ErrorKind> {
        let mut collected = vec![];
        loop {
            match chunks.next_chunk().await {
                Ok(Some(chunk)) => collected.push(chunk),
                Ok(None) => return Ok(collected),
                Err(err) => return Err(err.kind()),
            }
        }
    }

    #[tokio::test]
    async fn test_send_request() {
        let mut transport = TestTransport::default();
        transport.add_reply(PresetReply::with_chunks(["How ", "are ", "you?"]));
        transport.add_reply(
            PresetReply::with_chunks(["Let me "])
                .ending_with(PresetEnding::Interrupt),
        );

        let client = ReplyClient::new(transport.clone());

        let mut chunks =
            client.send_request(ChatRequest::new("Hi")).await.unwrap();
        assert_eq!(
            collect(&mut chunks).await.unwrap(),
            ["How ", "are ", "you?"]
        );

        let mut chunks =
            client.send_request(ChatRequest::new("Again")).await.unwrap();
        assert_eq!(collect(&mut chunks).await, Err(ErrorKind::Interrupted));

        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_error_handling() {
        let client = ReplyClient::new(TestTransport::default());
        let result = client.send_request(ChatRequest::new("Hi")).await;
        assert!(matches!(
            result,
            Err(err) if err.kind() == ErrorKind::Unavailable
        ));
    }
}
