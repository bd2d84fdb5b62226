use super::{Chunks, ChunksError};

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    ChunksError(ChunksError),
    InvalidPayload,
}

/// A type for reading UTF-8 text from a chunk stream.
///
/// The body is plain text, but the network is free to split it anywhere,
/// including in the middle of a multi-byte code point. Incomplete trailing
/// bytes are held back until the rest of the code point arrives.
pub struct TextDecoder {
    pending: Vec<u8>,
    chunks: Chunks,
}

impl TextDecoder {
    #[inline]
    pub fn new(chunks: Chunks) -> Self {
        Self {
            pending: Vec::new(),
            chunks,
        }
    }

    /// Returns the next non-empty piece of text, or `None` at the end of
    /// the body.
    pub async fn next_text(&mut self) -> Result<Option<String>, Error> {
        loop {
            let Some(bytes) =
                self.chunks.next_chunk().await.map_err(Error::ChunksError)?
            else {
                // The body ended in the middle of a code point.
                if !self.pending.is_empty() {
                    return Err(Error::InvalidPayload);
                }
                return Ok(None);
            };

            self.pending.extend_from_slice(&bytes);
            let text = self.take_decoded()?;
            if !text.is_empty() {
                return Ok(Some(text));
            }
        }
    }

    fn take_decoded(&mut self) -> Result<String, Error> {
        let valid_len = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            // `error_len` is `None` when the input merely ends too early.
            Err(err) if err.error_len().is_none() => err.valid_up_to(),
            Err(_) => return Err(Error::InvalidPayload),
        };

        let rest = self.pending.split_off(valid_len);
        let decoded = std::mem::replace(&mut self.pending, rest);
        String::from_utf8(decoded).map_err(|_| Error::InvalidPayload)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[tokio::test]
    async fn test_plain_chunks() {
        let chunks = Chunks::from_vec_deque(
            vec![
                Bytes::from_static(b"We're "),
                Bytes::from_static(b"open "),
                Bytes::from_static(b"9-5."),
            ]
            .into(),
        );
        let mut decoder = TextDecoder::new(chunks);
        assert_eq!(decoder.next_text().await.unwrap().unwrap(), "We're ");
        assert_eq!(decoder.next_text().await.unwrap().unwrap(), "open ");
        assert_eq!(decoder.next_text().await.unwrap().unwrap(), "9-5.");
        assert_eq!(decoder.next_text().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_split_code_point() {
        // "Grüße" with the `ü` split across two chunks.
        let bytes = "Grüße".as_bytes();
        let chunks = Chunks::from_vec_deque(
            vec![
                Bytes::copy_from_slice(&bytes[..3]),
                Bytes::copy_from_slice(&bytes[3..]),
            ]
            .into(),
        );
        let mut decoder = TextDecoder::new(chunks);
        assert_eq!(decoder.next_text().await.unwrap().unwrap(), "Gr");
        assert_eq!(decoder.next_text().await.unwrap().unwrap(), "üße");
        assert_eq!(decoder.next_text().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_lone_partial_chunk_is_skipped() {
        let bytes = "é".as_bytes();
        let chunks = Chunks::from_vec_deque(
            vec![
                Bytes::copy_from_slice(&bytes[..1]),
                Bytes::copy_from_slice(&bytes[1..]),
            ]
            .into(),
        );
        let mut decoder = TextDecoder::new(chunks);
        assert_eq!(decoder.next_text().await.unwrap().unwrap(), "é");
        assert_eq!(decoder.next_text().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_data() {
        let chunks = Chunks::from_vec_deque(
            vec![Bytes::from_static(b"ok \xff\xfe")].into(),
        );
        let mut decoder = TextDecoder::new(chunks);
        assert_eq!(
            decoder.next_text().await.unwrap_err(),
            Error::InvalidPayload
        );

        // Truncated code point at the end of the body.
        let chunks = Chunks::from_vec_deque(
            vec![Bytes::from_static(b"caf\xc3")].into(),
        );
        let mut decoder = TextDecoder::new(chunks);
        assert_eq!(decoder.next_text().await.unwrap().unwrap(), "caf");
        assert_eq!(
            decoder.next_text().await.unwrap_err(),
            Error::InvalidPayload
        );
    }

    #[tokio::test]
    async fn test_interrupted_body() {
        let chunks = Chunks::from_results(
            vec![
                Ok(Bytes::from_static(b"Sure, ")),
                Err(ChunksError("connection reset".to_owned())),
            ]
            .into(),
        );
        let mut decoder = TextDecoder::new(chunks);
        assert_eq!(decoder.next_text().await.unwrap().unwrap(), "Sure, ");
        assert!(matches!(
            decoder.next_text().await.unwrap_err(),
            Error::ChunksError(_)
        ));
    }
}
