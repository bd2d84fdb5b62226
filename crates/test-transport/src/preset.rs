use serde::{Deserialize, Serialize};

/// How a preset reply ends after its chunks have been delivered.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PresetEnding {
    /// The stream ends normally.
    #[default]
    Complete,
    /// The stream fails with an `Interrupted` error.
    Interrupt,
    /// The stream yields an undecodable payload.
    Garble,
    /// The stream never delivers anything else. Useful for cancellation.
    Hang,
}

/// The preset reply for one request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetReply {
    /// Text chunks in this reply.
    pub chunks: Vec<String>,
    /// What happens after the last chunk.
    #[serde(default)]
    pub ending: PresetEnding,
    /// If set, the request itself is refused before any stream is opened.
    #[serde(default)]
    pub refuse: bool,
}

impl PresetReply {
    /// Creates a `PresetReply` that streams the specified chunks.
    #[inline]
    pub fn with_chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            ending: PresetEnding::Complete,
            refuse: false,
        }
    }

    /// Creates a `PresetReply` whose request never gets through.
    #[inline]
    pub fn refused() -> Self {
        Self {
            chunks: vec![],
            ending: PresetEnding::Complete,
            refuse: true,
        }
    }

    /// Sets how the reply ends after its chunks.
    #[inline]
    pub fn ending_with(mut self, ending: PresetEnding) -> Self {
        self.ending = ending;
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_deserialize_script() {
        let reply: PresetReply = serde_json::from_value(json!({
            "chunks": ["We're ", "open ", "9-5."],
        }))
        .unwrap();
        assert_eq!(
            reply,
            PresetReply::with_chunks(["We're ", "open ", "9-5."])
        );

        let reply: PresetReply = serde_json::from_value(json!({
            "chunks": ["Sure, "],
            "ending": "hang",
        }))
        .unwrap();
        assert_eq!(reply.ending, PresetEnding::Hang);
        assert!(!reply.refuse);
    }
}
