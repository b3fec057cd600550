//! StartStudyHandler - Submit the setup form and start the staged study.

use crate::application::StudyHandle;
use crate::domain::study::{StudyError, StudySetupForm, StudySnapshot};

/// Command to start a study.
#[derive(Debug, Clone)]
pub struct StartStudyCommand {
    pub goal: String,
    pub criteria: String,
    pub agent_count: u32,
}

impl From<StartStudyCommand> for StudySetupForm {
    fn from(cmd: StartStudyCommand) -> Self {
        StudySetupForm {
            goal: cmd.goal,
            criteria: cmd.criteria,
            agent_count: cmd.agent_count,
        }
    }
}

/// Handler for starting studies.
pub struct StartStudyHandler {
    study: StudyHandle,
}

impl StartStudyHandler {
    pub fn new(study: StudyHandle) -> Self {
        Self { study }
    }

    pub async fn handle(&self, cmd: StartStudyCommand) -> Result<StudySnapshot, StudyError> {
        self.study.submit(cmd.into()).await
    }
}
