//! Chat transcript messages.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MessageId, Timestamp};

use super::persona::PersonaId;

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Agent,
}

/// A transcript entry.
///
/// # Invariants
///
/// - Append-only: once in the transcript only the insight placeholder is
///   ever rewritten, and only through [`Message::fill_placeholder`]
/// - `persona` is only set on agent replies attributed to a persona
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    sender: Sender,
    #[serde(skip_serializing_if = "Option::is_none")]
    persona: Option<PersonaId>,
    text: String,
    created_at: Timestamp,
}

impl Message {
    fn new(sender: Sender, persona: Option<PersonaId>, text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            sender,
            persona,
            text: text.into(),
            created_at: Timestamp::now(),
        }
    }

    /// Creates a user-authored message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, None, text)
    }

    /// Creates a generic agent message.
    pub fn agent(text: impl Into<String>) -> Self {
        Self::new(Sender::Agent, None, text)
    }

    /// Creates an agent message attributed to a persona.
    pub fn from_persona(persona: PersonaId, text: impl Into<String>) -> Self {
        Self::new(Sender::Agent, Some(persona), text)
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn persona(&self) -> Option<&PersonaId> {
        self.persona.as_ref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Overwrites the text of a placeholder entry in place.
    pub(crate) fn fill_placeholder(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}
