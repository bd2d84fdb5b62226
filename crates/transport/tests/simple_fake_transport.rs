use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::task::{self, Poll, ready};
use std::time::Duration;

use chatdesk_transport::{
    ChatRequest, ChatTransport, ErrorKind, ReplyStream, TransportError,
};
use tokio::time::{Sleep, sleep};

#[derive(Debug)]
struct FakeTransportError(ErrorKind);

impl Display for FakeTransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for FakeTransportError {}

impl TransportError for FakeTransportError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

#[derive(Debug)]
struct EchoStream {
    words: VecDeque<String>,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl EchoStream {
    fn new(input: &str) -> Self {
        let words = format!("You said {}", input)
            .split(" ")
            .map(ToString::to_string)
            .collect();
        Self { words, sleep: None }
    }
}

impl ReplyStream for EchoStream {
    type Error = FakeTransportError;

    fn poll_next_chunk(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<String>, Self::Error>> {
        let this = self.get_mut();
        if let Some(sleep) = &mut this.sleep {
            ready!(sleep.as_mut().poll(cx));
            this.sleep = None;

            if let Some(mut word) = this.words.pop_front() {
                if !this.words.is_empty() {
                    word.push(' ');
                }
                return Poll::Ready(Ok(Some(word)));
            }

            return Poll::Ready(Ok(None));
        }
        this.sleep = Some(Box::pin(sleep(Duration::from_millis(1))));
        Pin::new(this).poll_next_chunk(cx)
    }
}

struct EchoTransport;

impl ChatTransport for EchoTransport {
    type Error = FakeTransportError;
    type Stream = EchoStream;

    fn send_request(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<Self::Stream, Self::Error>> + Send + 'static
    {
        let result = if req.prompt.is_empty() {
            Err(FakeTransportError(ErrorKind::Rejected))
        } else {
            Ok(EchoStream::new(&req.prompt))
        };
        ready(result)
    }
}

mod tests {
    use std::future::poll_fn;

    use super::*;

    #[tokio::test]
    async fn test_streaming() {
        let transport = EchoTransport;
        let req = ChatRequest::new("Good morning");
        let mut stream = transport.send_request(&req).await.unwrap();

        let mut reply = String::new();
        let mut chunk_count = 0;
        loop {
            let chunk_fut =
                poll_fn(|cx| Pin::new(&mut stream).poll_next_chunk(cx));
            match chunk_fut.await {
                Ok(Some(chunk)) => {
                    chunk_count += 1;
                    reply.push_str(&chunk);
                }
                Ok(None) => break,
                Err(err) => unreachable!("unexpected error: {err:?}"),
            }
        }

        assert_eq!(reply, "You said Good morning");
        assert_eq!(chunk_count, 4);

        // Exhausted streams keep reporting the end.
        let chunk = poll_fn(|cx| Pin::new(&mut stream).poll_next_chunk(cx))
            .await
            .unwrap();
        assert_eq!(chunk, None);
    }

    #[tokio::test]
    async fn test_error() {
        let transport = EchoTransport;
        let result = transport.send_request(&ChatRequest::new("")).await;
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Rejected);
    }
}
