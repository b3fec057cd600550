//! SendMessageHandler - Append a chat message and queue its reply.

use crate::application::StudyHandle;
use crate::domain::study::{StudyError, StudySnapshot};

/// Command to send a chat message.
#[derive(Debug, Clone)]
pub struct SendMessageCommand {
    pub text: String,
}

/// Handler for chat messages. Returns once the user message is in the
/// transcript; the reply arrives later through snapshots.
pub struct SendMessageHandler {
    study: StudyHandle,
}

impl SendMessageHandler {
    pub fn new(study: StudyHandle) -> Self {
        Self { study }
    }

    pub async fn handle(&self, cmd: SendMessageCommand) -> Result<StudySnapshot, StudyError> {
        self.study.send_message(cmd.text).await
    }
}
