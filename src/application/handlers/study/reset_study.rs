//! ResetStudyHandler - Tear the current study down and return to idle.

use crate::application::StudyHandle;
use crate::domain::study::{StudyError, StudySnapshot};

pub struct ResetStudyHandler {
    study: StudyHandle,
}

impl ResetStudyHandler {
    pub fn new(study: StudyHandle) -> Self {
        Self { study }
    }

    pub async fn handle(&self) -> Result<StudySnapshot, StudyError> {
        self.study.reset().await
    }
}
