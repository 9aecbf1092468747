use intake_model::{
    ModelFinishReason, ModelMessage, ModelRequest, ModelResponse, Role,
};
use serde::{Deserialize, Serialize};

use crate::OllamaConfig;

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ChatResponse {
    pub message: Option<Message>,
    pub done_reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct GenerateResponse {
    pub response: Option<String>,
    pub done_reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct VersionResponse {
    pub version: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}

/// A model installed on the Ollama server.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model name with tag, e.g. `qwen3:30b`.
    pub name: String,
    /// Last modification time as reported by the server.
    #[serde(default)]
    pub modified_at: Option<String>,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_chat_request(
    req: &ModelRequest,
    config: &OllamaConfig,
) -> ChatRequest {
    ChatRequest {
        model: config.model.clone(),
        messages: req.messages.iter().map(create_message).collect(),
        stream: false,
    }
}

#[inline]
pub fn create_generate_request(
    req: &ModelRequest,
    config: &OllamaConfig,
) -> GenerateRequest {
    GenerateRequest {
        model: config.model.clone(),
        prompt: flatten_transcript(&req.messages),
        stream: false,
    }
}

#[inline]
fn create_message(msg: &ModelMessage) -> Message {
    Message {
        role: msg.role(),
        content: msg.content().to_owned(),
    }
}

/// A lone user message goes out bare; anything longer becomes one
/// `role: content` line per message.
fn flatten_transcript(messages: &[ModelMessage]) -> String {
    if let [ModelMessage::User(prompt)] = messages {
        return prompt.clone();
    }
    messages
        .iter()
        .map(|msg| format!("{}: {}", msg.role(), msg.content()))
        .collect::<Vec<_>>()
        .join("\n")
}

impl ChatResponse {
    #[inline]
    pub fn into_model_response(self) -> Option<ModelResponse> {
        Some(ModelResponse {
            content: self.message?.content,
            finish_reason: self
                .done_reason
                .as_deref()
                .map(ModelFinishReason::from_wire),
        })
    }
}

impl GenerateResponse {
    #[inline]
    pub fn into_model_response(self) -> Option<ModelResponse> {
        Some(ModelResponse {
            content: self.response?,
            finish_reason: self
                .done_reason
                .as_deref()
                .map(ModelFinishReason::from_wire),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::OllamaConfigBuilder;

    fn transcript() -> ModelRequest {
        ModelRequest {
            messages: vec![
                ModelMessage::System("Collect the game brief.".to_owned()),
                ModelMessage::User("Hi".to_owned()),
                ModelMessage::Assistant("Which engine?".to_owned()),
                ModelMessage::User("Unity".to_owned()),
            ],
        }
    }

    #[test]
    fn test_create_chat_request() {
        let config = OllamaConfigBuilder::with_model("qwen3:30b").build();
        let body =
            serde_json::to_value(create_chat_request(&transcript(), &config))
                .unwrap();
        assert_eq!(
            body,
            json!({
                "model": "qwen3:30b",
                "messages": [
                    { "role": "system", "content": "Collect the game brief." },
                    { "role": "user", "content": "Hi" },
                    { "role": "assistant", "content": "Which engine?" },
                    { "role": "user", "content": "Unity" },
                ],
                "stream": false,
            })
        );
    }

    #[test]
    fn test_create_generate_request() {
        let config = OllamaConfigBuilder::with_model("qwen3-coder:30b").build();
        let req = create_generate_request(&transcript(), &config);
        assert_eq!(
            req.prompt,
            "system: Collect the game brief.\nuser: Hi\n\
             assistant: Which engine?\nuser: Unity"
        );
        assert!(!req.stream);
    }

    #[test]
    fn test_single_prompt_is_not_prefixed() {
        let config = OllamaConfigBuilder::with_model("m").build();
        let req = ModelRequest {
            messages: vec![ModelMessage::User("What is a tuple?".to_owned())],
        };
        let req = create_generate_request(&req, &config);
        assert_eq!(req.prompt, "What is a tuple?");
    }

    #[test]
    fn test_parse_chat_response() {
        let resp: ChatResponse = serde_json::from_value(json!({
            "model": "qwen3:30b",
            "created_at": "2025-01-01T00:00:00Z",
            "message": { "role": "assistant", "content": "Hello!" },
            "done": true,
            "done_reason": "stop",
        }))
        .unwrap();
        let resp = resp.into_model_response().unwrap();
        assert_eq!(resp.content, "Hello!");
        assert_eq!(resp.finish_reason, Some(ModelFinishReason::Stop));
    }

    #[test]
    fn test_generate_response_without_text() {
        let resp: GenerateResponse =
            serde_json::from_value(json!({ "done": true })).unwrap();
        assert_eq!(resp.into_model_response(), None);
    }

    #[test]
    fn test_parse_tags() {
        let resp: TagsResponse = serde_json::from_value(json!({
            "models": [{
                "name": "qwen3:30b",
                "modified_at": "2025-05-01T10:00:00Z",
                "size": 18556701140u64,
                "digest": "abc",
            }]
        }))
        .unwrap();
        assert_eq!(resp.models.len(), 1);
        assert_eq!(resp.models[0].name, "qwen3:30b");
        assert_eq!(
            resp.models[0].modified_at.as_deref(),
            Some("2025-05-01T10:00:00Z")
        );
    }
}
