//! GetStudyHandler - Read the latest study snapshot.

use crate::application::StudyHandle;
use crate::domain::study::StudySnapshot;

pub struct GetStudyHandler {
    study: StudyHandle,
}

impl GetStudyHandler {
    pub fn new(study: StudyHandle) -> Self {
        Self { study }
    }

    pub fn handle(&self) -> StudySnapshot {
        self.study.snapshot()
    }
}
