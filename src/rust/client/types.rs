use serde::{Deserialize, Serialize};

/// Body of a `POST /predict` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

impl TextRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Body of a successful `POST /predict` response.
///
/// The label vocabulary belongs to the backend and is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionResponse {
    pub emotion: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let body = serde_json::to_value(TextRequest::new("I am great")).unwrap();
        assert_eq!(body, serde_json::json!({ "text": "I am great" }));
    }

    #[test]
    fn test_response_ignores_extra_fields() {
        let response: EmotionResponse =
            serde_json::from_str(r#"{"emotion":"Joy","confidence":0.93}"#).unwrap();
        assert_eq!(response.emotion, "Joy");
    }

    #[test]
    fn test_response_requires_emotion() {
        assert!(serde_json::from_str::<EmotionResponse>(r#"{"label":"Joy"}"#).is_err());
    }
}
