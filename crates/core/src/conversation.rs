//! Conversation-related types.

use intake_model::{ModelMessage, ModelRequest, Role};

/// Whether a leading system message survives [`Conversation::clear`] and
/// [`Conversation::trim`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SystemRetention {
    /// The leading system message is pinned: clearing leaves only it, and
    /// trimming never drops it.
    #[default]
    Keep,
    /// The system message is treated like any other message.
    Drop,
}

/// Represents a conversation, the ordered transcript of one session.
///
/// Messages are never edited once appended. The whole transcript is sent
/// to the model on every turn.
#[derive(Clone, Default, Debug)]
pub struct Conversation {
    items: Vec<ModelMessage>,
    retention: SystemRetention,
}

impl Conversation {
    /// Creates an empty conversation with the given retention policy.
    #[inline]
    pub fn new(retention: SystemRetention) -> Self {
        Self {
            items: vec![],
            retention,
        }
    }

    /// Appends one message.
    #[inline]
    pub fn append(&mut self, msg: ModelMessage) {
        self.items.push(msg);
    }

    /// Appends one message with the given role.
    #[inline]
    pub fn push<S: Into<String>>(&mut self, role: Role, content: S) {
        self.append(ModelMessage::new(role, content));
    }

    /// Returns all messages, oldest first.
    #[inline]
    pub fn messages(&self) -> &[ModelMessage] {
        &self.items
    }

    /// Returns the most recent message.
    #[inline]
    pub fn last(&self) -> Option<&ModelMessage> {
        self.items.last()
    }

    /// Returns the number of messages.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there are no messages at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the retention policy for the system message.
    #[inline]
    pub fn retention(&self) -> SystemRetention {
        self.retention
    }

    /// Keeps at most `2 * max_pairs` of the most recent messages, dropping
    /// the oldest ones. Dropped turns are gone for good.
    ///
    /// A pinned system message (see [`SystemRetention::Keep`]) is not
    /// counted and always stays in front.
    pub fn trim(&mut self, max_pairs: usize) {
        let limit = max_pairs.saturating_mul(2);
        let pinned = self.pinned_len();
        let window = self.items.len() - pinned;
        if window <= limit {
            return;
        }
        let excess = window - limit;
        self.items.drain(pinned..pinned + excess);
        trace!("trimmed {excess} messages from the conversation");
    }

    /// Forgets the conversation, keeping only a pinned system message.
    #[inline]
    pub fn clear(&mut self) {
        let pinned = self.pinned_len();
        self.items.truncate(pinned);
    }

    /// Builds a request carrying the whole transcript.
    #[inline]
    pub fn to_request(&self) -> ModelRequest {
        ModelRequest {
            messages: self.items.clone(),
        }
    }

    fn pinned_len(&self) -> usize {
        let leading_system =
            matches!(self.items.first(), Some(ModelMessage::System(_)));
        if self.retention == SystemRetention::Keep && leading_system {
            1
        } else {
            0
        }
    }
}
