use serde::{Deserialize, Serialize};

/// The reason why a model response has finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelFinishReason {
    /// The model has finished generating text.
    Stop,
    /// The model hit its output length limit.
    Length,
    /// The backend reported some other reason.
    Other,
}

impl ModelFinishReason {
    /// Maps a backend-provided reason string to a finish reason.
    #[inline]
    pub fn from_wire(reason: &str) -> Self {
        match reason {
            "stop" => ModelFinishReason::Stop,
            "length" => ModelFinishReason::Length,
            _ => ModelFinishReason::Other,
        }
    }
}

/// A complete, non-streamed reply from the model provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelResponse {
    /// The generated text, exactly as the backend returned it.
    pub content: String,
    /// The reason the model finished generating, if reported.
    pub finish_reason: Option<ModelFinishReason>,
}

impl ModelResponse {
    /// Creates a response with the given content and a `Stop` reason.
    #[inline]
    pub fn with_content<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
            finish_reason: Some(ModelFinishReason::Stop),
        }
    }
}
