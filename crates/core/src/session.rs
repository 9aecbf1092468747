mod builder;

use intake_model::{ModelProviderError, Role};

pub use builder::SessionBuilder;
use crate::conversation::Conversation;
use crate::extract::{Extraction, ReasoningMarkers, extract_structured};
use crate::model_client::ModelClient;

/// A conversational session with a chat completion backend.
///
/// The session owns its transcript exclusively. Every [`send`] forwards
/// the whole transcript, so the model sees everything that has not been
/// trimmed or cleared.
///
/// [`send`]: Session::send
#[derive(Debug)]
pub struct Session {
    model_client: ModelClient,
    conversation: Conversation,
    markers: ReasoningMarkers,
    strip_reasoning: bool,
    history_window: Option<usize>,
}

impl Session {
    /// Appends a message without talking to the model.
    #[inline]
    pub fn append<S: Into<String>>(&mut self, role: Role, content: S) {
        self.conversation.push(role, content);
    }

    /// Sends `prompt` as a user turn and returns the model's reply.
    ///
    /// The raw reply is recorded in the transcript; the returned text has
    /// reasoning spans removed if the session strips them.
    ///
    /// On error the user turn stays in the transcript without an answer.
    /// Chat backends cope with two user turns in a row, so the next call
    /// can go ahead as usual.
    pub async fn send<S: Into<String>>(
        &mut self,
        prompt: S,
    ) -> Result<String, Box<dyn ModelProviderError>> {
        self.conversation.push(Role::User, prompt);
        if let Some(max_pairs) = self.history_window {
            self.conversation.trim(max_pairs);
        }

        let request = self.conversation.to_request();
        debug!("sending {} messages to the model", request.messages.len());
        let resp = self.model_client.send_request(request).await?;

        let reply = if self.strip_reasoning {
            self.markers.strip(&resp.content)
        } else {
            resp.content.trim().to_owned()
        };
        self.conversation.push(Role::Assistant, resp.content);
        Ok(reply)
    }

    /// Tries to read `reply` as the final structured record.
    ///
    /// Reasoning spans are always ignored for the parse attempt. When the
    /// reply is not a record, the text comes back cleaned only if this
    /// session strips reasoning.
    pub fn extract_structured(&self, reply: &str) -> Extraction {
        match extract_structured(reply, &self.markers) {
            Extraction::RawText(_) if !self.strip_reasoning => {
                Extraction::RawText(reply.to_owned())
            }
            extraction => extraction,
        }
    }

    /// Drops the oldest messages so that at most `max_pairs` turn pairs
    /// remain. See [`Conversation::trim`].
    #[inline]
    pub fn trim(&mut self, max_pairs: usize) {
        self.conversation.trim(max_pairs);
    }

    /// Forgets the dialog. Whether the system instructions survive is
    /// decided by the session's [`SystemRetention`].
    ///
    /// [`SystemRetention`]: crate::conversation::SystemRetention
    #[inline]
    pub fn clear(&mut self) {
        self.conversation.clear();
        debug!(
            "conversation cleared ({:?}), {} messages left",
            self.conversation.retention(),
            self.conversation.len()
        );
    }

    /// Returns the transcript.
    #[inline]
    pub fn transcript(&self) -> &Conversation {
        &self.conversation
    }
}
