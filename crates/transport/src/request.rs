use serde::{Deserialize, Serialize};

/// A request for an assistant reply.
///
/// On the wire this is the JSON object `{"message": ..., "context": ...}`,
/// where `context` is left out when there is none.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatRequest {
    /// What the customer typed.
    #[serde(rename = "message")]
    pub prompt: String,
    /// Extra facts about the customer or the business, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl ChatRequest {
    /// Creates a request without context.
    #[inline]
    pub fn new<S: Into<String>>(prompt: S) -> Self {
        Self {
            prompt: prompt.into(),
            context: None,
        }
    }

    /// Attaches a context string to the request.
    #[inline]
    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_wire_format() {
        let req = ChatRequest::new("Opening hours?");
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "message": "Opening hours?" })
        );

        let req = req.with_context("Customer name: Ada");
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "message": "Opening hours?",
                "context": "Customer name: Ada"
            })
        );
    }

    #[test]
    fn test_missing_context() {
        let req: ChatRequest =
            serde_json::from_str(r#"{"message":"Hi"}"#).unwrap();
        assert_eq!(req, ChatRequest::new("Hi"));
    }
}
