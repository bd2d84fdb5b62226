mod chunks;
mod text;

pub use chunks::{Chunks, Error as ChunksError};
pub use text::{Error as TextError, TextDecoder};
