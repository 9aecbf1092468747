use intake_model::{ModelProvider, Role};

use super::Session;
use crate::conversation::{Conversation, SystemRetention};
use crate::extract::ReasoningMarkers;
use crate::model_client::ModelClient;

/// [`Session`] builder.
pub struct SessionBuilder {
    model_client: ModelClient,
    system_prompt: Option<String>,
    markers: Option<ReasoningMarkers>,
    history_window: Option<usize>,
    retention: SystemRetention,
}

impl SessionBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            system_prompt: None,
            markers: None,
            history_window: None,
            retention: SystemRetention::default(),
        }
    }

    /// Sets the system prompt, which becomes the first message of the
    /// transcript.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Strips reasoning spans delimited by `markers` from every reply.
    #[inline]
    pub fn with_reasoning_markers(mut self, markers: ReasoningMarkers) -> Self {
        self.markers = Some(markers);
        self
    }

    /// Keeps only the last `max_pairs` user/assistant pairs before each
    /// request. The window holds at least one pair, so the prompt being
    /// sent is never trimmed away.
    #[inline]
    pub fn with_history_window(mut self, max_pairs: usize) -> Self {
        self.history_window = Some(max_pairs.max(1));
        self
    }

    /// Sets what happens to the system prompt on clear and trim.
    #[inline]
    pub fn with_system_retention(mut self, retention: SystemRetention) -> Self {
        self.retention = retention;
        self
    }

    /// Builds the session.
    pub fn build(self) -> Session {
        let mut conversation = Conversation::new(self.retention);
        if let Some(prompt) = self.system_prompt {
            conversation.push(Role::System, prompt);
        }
        Session {
            model_client: self.model_client,
            conversation,
            strip_reasoning: self.markers.is_some(),
            markers: self.markers.unwrap_or_default(),
            history_window: self.history_window,
        }
    }
}
