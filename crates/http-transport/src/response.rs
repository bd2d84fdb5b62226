use std::pin::Pin;
use std::task::{Context, Poll, ready};

use chatdesk_transport::{ErrorKind, ReplyStream};
use pin_project_lite::pin_project;

use crate::Error;
use crate::io::{TextDecoder, TextError};

type PinnedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type NextChunk = Result<(Option<String>, TextDecoder), Error>;

pin_project! {
    pub struct HttpReplyStream {
        next_chunk_fut: Option<PinnedFuture<NextChunk>>,
        received_bytes: usize,
    }
}

impl HttpReplyStream {
    #[inline]
    pub fn from_decoder(decoder: TextDecoder) -> Self {
        let next_chunk_fut = async move { next_chunk(decoder).await };
        Self {
            next_chunk_fut: Some(Box::pin(next_chunk_fut)),
            received_bytes: 0,
        }
    }
}

impl ReplyStream for HttpReplyStream {
    type Error = crate::Error;

    fn poll_next_chunk(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<String>, Self::Error>> {
        let this = self.project();
        let Some(next_chunk_fut) = this.next_chunk_fut else {
            // The body has been exhausted.
            return Poll::Ready(Ok(None));
        };
        let (text, decoder) = match ready!(next_chunk_fut.as_mut().poll(cx)) {
            Ok((Some(text), decoder)) => (text, decoder),
            Ok((None, _)) => {
                *this.next_chunk_fut = None;
                debug!("reply finished after {} bytes", this.received_bytes);
                return Poll::Ready(Ok(None));
            }
            Err(err) => {
                *this.next_chunk_fut = None;
                return Poll::Ready(Err(err));
            }
        };

        // The body may still have more data to pull, create a new future for
        // the next chunk.
        *this.received_bytes += text.len();
        let next_chunk_fut = async move { next_chunk(decoder).await };
        *this.next_chunk_fut = Some(Box::pin(next_chunk_fut));

        Poll::Ready(Ok(Some(text)))
    }
}

async fn next_chunk(mut decoder: TextDecoder) -> NextChunk {
    match decoder.next_text().await {
        Ok(text) => {
            if let Some(text) = &text {
                trace!("got text chunk: {text:?}");
            }
            Ok((text, decoder))
        }
        Err(TextError::ChunksError(err)) => {
            Err(Error::new(err.0, ErrorKind::Interrupted))
        }
        Err(TextError::InvalidPayload) => Err(Error::new(
            "reply body is not valid UTF-8",
            ErrorKind::InvalidPayload,
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::future::poll_fn;
    use std::pin::pin;

    use bytes::Bytes;
    use chatdesk_transport::TransportError;

    use super::*;
    use crate::io::{Chunks, ChunksError};

    #[tokio::test]
    async fn test_stream_text() {
        let chunks = Chunks::from_vec_deque(
            vec![
                Bytes::from_static(b"We're "),
                Bytes::from_static(b"open "),
                Bytes::from_static(b"9-5."),
            ]
            .into(),
        );
        let mut resp = pin!(HttpReplyStream::from_decoder(TextDecoder::new(
            chunks
        )));
        let mut text = String::new();
        while let Some(chunk) = poll_fn(|cx| resp.as_mut().poll_next_chunk(cx))
            .await
            .unwrap()
        {
            text.push_str(&chunk);
        }
        assert_eq!(text, "We're open 9-5.");

        let chunk = poll_fn(|cx| resp.as_mut().poll_next_chunk(cx))
            .await
            .unwrap();
        assert_eq!(chunk, None);
    }

    #[tokio::test]
    async fn test_stream_error_kinds() {
        let chunks = Chunks::from_results(
            vec![
                Ok(Bytes::from_static(b"Sure, ")),
                Err(ChunksError("connection reset".to_owned())),
            ]
            .into(),
        );
        let mut resp = pin!(HttpReplyStream::from_decoder(TextDecoder::new(
            chunks
        )));
        let chunk = poll_fn(|cx| resp.as_mut().poll_next_chunk(cx))
            .await
            .unwrap();
        assert_eq!(chunk.as_deref(), Some("Sure, "));
        let err = poll_fn(|cx| resp.as_mut().poll_next_chunk(cx))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Interrupted);

        let chunks = Chunks::from_vec_deque(
            vec![Bytes::from_static(b"\xff")].into(),
        );
        let mut resp = pin!(HttpReplyStream::from_decoder(TextDecoder::new(
            chunks
        )));
        let err = poll_fn(|cx| resp.as_mut().poll_next_chunk(cx))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPayload);
    }
}
