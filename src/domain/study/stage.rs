//! Study progress stages.
//!
//! A study walks through five visible stages in strict order, one step per
//! timer firing. `NotStarted` sits before the first stage while the setup
//! form is shown.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Progress stage of a staged study.
///
/// Integer form (see [`Stage::index`]) ranges from -1 (not started) to 4 (done).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    NotStarted,
    CreatingAgents,
    PerformingTasks,
    Surveying,
    GeneratingInsights,
    Done,
}

impl Stage {
    /// The five visible stages in display order.
    pub const PROGRESS: [Stage; 5] = [
        Stage::CreatingAgents,
        Stage::PerformingTasks,
        Stage::Surveying,
        Stage::GeneratingInsights,
        Stage::Done,
    ];

    /// Integer form: -1 for `NotStarted`, 0..=4 for the progress stages.
    pub fn index(&self) -> i8 {
        match self {
            Self::NotStarted => -1,
            Self::CreatingAgents => 0,
            Self::PerformingTasks => 1,
            Self::Surveying => 2,
            Self::GeneratingInsights => 3,
            Self::Done => 4,
        }
    }

    /// Inverse of [`Stage::index`].
    pub fn from_index(index: i8) -> Option<Self> {
        match index {
            -1 => Some(Self::NotStarted),
            0..=4 => Some(Self::PROGRESS[index as usize]),
            _ => None,
        }
    }

    /// Position within [`Stage::PROGRESS`], `None` before the study starts.
    pub fn progress_position(&self) -> Option<usize> {
        usize::try_from(self.index()).ok()
    }

    /// Label shown in the progress indicator.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotStarted => "Not started",
            Self::CreatingAgents => "Creating UserAgents",
            Self::PerformingTasks => "UserAgents performing tasks",
            Self::Surveying => "Surveying UserAgents",
            Self::GeneratingInsights => "Generating insights",
            Self::Done => "Done",
        }
    }

    /// The stage that follows this one, if any.
    ///
    /// `NotStarted` is followed by `CreatingAgents`, but that step is taken by
    /// form submission. [`Stage::awaits_timer`] is what keeps `NotStarted` out
    /// of the timer path.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::NotStarted => Some(Self::CreatingAgents),
            Self::CreatingAgents => Some(Self::PerformingTasks),
            Self::PerformingTasks => Some(Self::Surveying),
            Self::Surveying => Some(Self::GeneratingInsights),
            Self::GeneratingInsights => Some(Self::Done),
            Self::Done => None,
        }
    }

    /// True while a stage timer should be pending (stages 0..=3).
    pub fn awaits_timer(&self) -> bool {
        matches!(
            self,
            Self::CreatingAgents | Self::PerformingTasks | Self::Surveying | Self::GeneratingInsights
        )
    }

    /// All progress labels in display order.
    pub fn labels() -> Vec<&'static str> {
        Self::PROGRESS.iter().map(Stage::label).collect()
    }
}

impl StateMachine for Stage {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.next().as_ref() == Some(target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        self.next().into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_is_not_started() {
        assert_eq!(Stage::default(), Stage::NotStarted);
        assert_eq!(Stage::default().index(), -1);
    }

    #[test]
    fn index_roundtrips_through_from_index() {
        for index in -1..=4 {
            let stage = Stage::from_index(index).unwrap();
            assert_eq!(stage.index(), index);
        }
        assert_eq!(Stage::from_index(5), None);
        assert_eq!(Stage::from_index(-2), None);
    }

    #[test]
    fn labels_match_progress_indicator() {
        assert_eq!(
            Stage::labels(),
            vec![
                "Creating UserAgents",
                "UserAgents performing tasks",
                "Surveying UserAgents",
                "Generating insights",
                "Done",
            ]
        );
    }

    #[test]
    fn done_is_terminal_and_does_not_await_timer() {
        assert!(Stage::Done.is_terminal());
        assert!(!Stage::Done.awaits_timer());
        assert!(!Stage::NotStarted.awaits_timer());
        assert_eq!(Stage::NotStarted.next(), Some(Stage::CreatingAgents));
        assert!(Stage::GeneratingInsights.awaits_timer());
    }

    #[test]
    fn cannot_skip_or_go_back() {
        assert!(Stage::CreatingAgents.transition_to(Stage::Surveying).is_err());
        assert!(Stage::Surveying.transition_to(Stage::PerformingTasks).is_err());
        assert!(Stage::Surveying.transition_to(Stage::GeneratingInsights).is_ok());
    }

    #[test]
    fn serializes_to_snake_case() {
        let json = serde_json::to_string(&Stage::GeneratingInsights).unwrap();
        assert_eq!(json, "\"generating_insights\"");
    }

    proptest! {
        #[test]
        fn next_always_increments_index_by_one(index in -1i8..4) {
            let stage = Stage::from_index(index).unwrap();
            let next = stage.next().unwrap();
            prop_assert_eq!(next.index(), index + 1);
            prop_assert!(next.index() <= 4);
        }
    }
}
