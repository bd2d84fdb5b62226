//! A local fake transport for testing purpose.

mod preset;

use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, ready};
use std::time::Duration;

use chatdesk_transport::{
    ChatRequest, ChatTransport, ErrorKind, ReplyStream, TransportError,
};
use tokio::time::{Sleep, sleep};

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    #[allow(dead_code)]
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl StdError for Error {}

impl TransportError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

pub struct TestReplyStream {
    reply: PresetReply,
    delay: Duration,
    chunk_idx: usize,
    finished: bool,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl ReplyStream for TestReplyStream {
    type Error = crate::Error;

    fn poll_next_chunk(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<String>, Self::Error>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(Ok(None));
        }

        if let Some(sleep) = &mut this.sleep {
            ready!(sleep.as_mut().poll(cx));
            this.sleep = None;

            if let Some(chunk) = this.reply.chunks.get(this.chunk_idx) {
                this.chunk_idx += 1;
                return Poll::Ready(Ok(Some(chunk.clone())));
            }

            return match this.reply.ending {
                PresetEnding::Complete => {
                    this.finished = true;
                    Poll::Ready(Ok(None))
                }
                PresetEnding::Interrupt => {
                    this.finished = true;
                    Poll::Ready(Err(Error {
                        message: "connection reset",
                        kind: ErrorKind::Interrupted,
                    }))
                }
                PresetEnding::Garble => {
                    this.finished = true;
                    Poll::Ready(Err(Error {
                        message: "invalid utf-8",
                        kind: ErrorKind::InvalidPayload,
                    }))
                }
                // Nobody will ever wake us up again.
                PresetEnding::Hang => Poll::Pending,
            };
        }
        this.sleep = Some(Box::pin(sleep(this.delay)));
        Pin::new(this).poll_next_chunk(cx)
    }
}

/// A local fake transport for testing purpose.
///
/// Before sending requests, you need to setup the reply script, which is how
/// the backend should answer each request. Replies are consumed in order, one
/// per request. If there are no enough replies in the script, an error will
/// be returned.
///
/// Clones share the recorded requests, so a test can keep a clone around
/// to inspect what the code under test has sent.
#[derive(Clone, Default)]
pub struct TestTransport {
    script: Vec<PresetReply>,
    delay: Option<Duration>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl TestTransport {
    #[inline]
    pub fn add_reply(&mut self, preset: PresetReply) {
        self.script.push(preset);
    }

    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns all requests received so far.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl ChatTransport for TestTransport {
    type Error = crate::Error;
    type Stream = TestReplyStream;

    fn send_request(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<Self::Stream, Self::Error>> + Send + 'static
    {
        let request_idx = match self.requests.lock() {
            Ok(mut requests) => {
                requests.push(req.clone());
                requests.len() - 1
            }
            Err(_) => usize::MAX,
        };

        let result = match self.script.get(request_idx) {
            None => Err(Error {
                message: "no enough replies",
                kind: ErrorKind::Unavailable,
            }),
            Some(reply) if reply.refuse => Err(Error {
                message: "connection refused",
                kind: ErrorKind::Unavailable,
            }),
            Some(reply) => Ok(TestReplyStream {
                reply: reply.clone(),
                delay: self.delay.unwrap_or(Duration::from_millis(1)),
                chunk_idx: 0,
                finished: false,
                sleep: None,
            }),
        };
        ready(result)
    }
}
