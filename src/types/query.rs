use serde::{Deserialize, Serialize};

/// Body of a query request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryRequest {
    /// The user's question, sent as typed.
    pub question: String,
}

impl QueryRequest {
    /// Creates a new query request.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }
}

/// A successful query answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryResponse {
    /// The backend's answer text, verbatim.
    pub answer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_wire_shape() {
        let json = serde_json::to_value(QueryRequest::new("What is 2+2?")).unwrap();
        assert_eq!(json, serde_json::json!({"question": "What is 2+2?"}));
    }
}
