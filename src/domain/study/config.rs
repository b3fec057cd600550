//! Study setup submitted through the form.

use serde::Serialize;

use crate::domain::foundation::{require_non_blank, ValidationError};

/// Validated study setup.
///
/// # Invariants
///
/// - `goal` and `criteria` contain at least one non-whitespace character
/// - `agent_count >= 1`
/// - Immutable once constructed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudyConfig {
    goal: String,
    criteria: String,
    agent_count: u32,
}

impl StudyConfig {
    /// Validates and builds a study setup.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if goal or criteria is empty/whitespace-only
    /// - `OutOfRange` if agent_count is 0
    pub fn new(
        goal: impl Into<String>,
        criteria: impl Into<String>,
        agent_count: u32,
    ) -> Result<Self, ValidationError> {
        let goal = goal.into();
        let criteria = criteria.into();

        require_non_blank("goal", &goal)?;
        require_non_blank("criteria", &criteria)?;
        if agent_count == 0 {
            return Err(ValidationError::out_of_range(
                "agent_count",
                1,
                i64::from(u32::MAX),
                0,
            ));
        }

        Ok(Self {
            goal,
            criteria,
            agent_count,
        })
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn criteria(&self) -> &str {
        &self.criteria
    }

    pub fn agent_count(&self) -> u32 {
        self.agent_count
    }
}

/// Raw form input, not yet validated.
#[derive(Debug, Clone)]
pub struct StudySetupForm {
    pub goal: String,
    pub criteria: String,
    pub agent_count: u32,
}

impl TryFrom<StudySetupForm> for StudyConfig {
    type Error = ValidationError;

    fn try_from(form: StudySetupForm) -> Result<Self, Self::Error> {
        StudyConfig::new(form.goal, form.criteria, form.agent_count)
    }
}
