//! Task status shared by visitors and the sync pipeline

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Idle,
    Processing,
    Success,
    PartialSuccess,
    Failed,
    /// Nothing to do here; the next strategy should take over
    Passthrough,
}

impl TaskStatus {
    /// Combine the current status with a newly reported one
    pub fn transition(self, next: TaskStatus) -> TaskStatus {
        use TaskStatus::*;
        match (self, next) {
            (Idle, next) => next,
            (Processing, next) => next,

            (Success, Failed) => PartialSuccess,
            (Success, PartialSuccess) => PartialSuccess,
            (Success, Idle | Processing | Success | Passthrough) => Success,

            (PartialSuccess, _) => PartialSuccess,

            (Failed, Success | PartialSuccess) => PartialSuccess,
            (Failed, Processing) => Processing,
            (Failed, Idle | Failed | Passthrough) => Failed,

            (Passthrough, Idle) => Passthrough,
            (Passthrough, next) => next,
        }
    }

    /// Fold a sequence of reported statuses starting from `Idle`
    pub fn fold<I: IntoIterator<Item = TaskStatus>>(statuses: I) -> TaskStatus {
        statuses
            .into_iter()
            .fold(TaskStatus::Idle, TaskStatus::transition)
    }

    pub fn is_success(self) -> bool {
        matches!(self, TaskStatus::Success | TaskStatus::PartialSuccess)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Idle => "idle",
            TaskStatus::Processing => "processing",
            TaskStatus::Success => "success",
            TaskStatus::PartialSuccess => "partial_success",
            TaskStatus::Failed => "failed",
            TaskStatus::Passthrough => "passthrough",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::TaskStatus::{self, *};

    const ALL: [TaskStatus; 6] = [Idle, Processing, Success, PartialSuccess, Failed, Passthrough];

    #[test]
    fn test_full_transition_table() {
        let expected = [
            // next:  Idle, Processing, Success, PartialSuccess, Failed, Passthrough
            (Idle, [Idle, Processing, Success, PartialSuccess, Failed, Passthrough]),
            (Processing, [Idle, Processing, Success, PartialSuccess, Failed, Passthrough]),
            (Success, [Success, Success, Success, PartialSuccess, PartialSuccess, Success]),
            (
                PartialSuccess,
                [
                    PartialSuccess,
                    PartialSuccess,
                    PartialSuccess,
                    PartialSuccess,
                    PartialSuccess,
                    PartialSuccess,
                ],
            ),
            (Failed, [Failed, Processing, PartialSuccess, PartialSuccess, Failed, Failed]),
            (Passthrough, [Passthrough, Processing, Success, PartialSuccess, Failed, Passthrough]),
        ];

        for (from, row) in expected {
            for (next, want) in ALL.iter().zip(row) {
                assert_eq!(from.transition(*next), want, "{from} + {next}");
            }
        }
    }

    #[test]
    fn test_fold() {
        assert_eq!(TaskStatus::fold([Success, Success]), Success);
        assert_eq!(TaskStatus::fold([Success, Failed]), PartialSuccess);
        assert_eq!(TaskStatus::fold([Failed, Failed]), Failed);
        assert_eq!(TaskStatus::fold([Passthrough]), Passthrough);
        assert_eq!(TaskStatus::fold(std::iter::empty()), Idle);
        assert!(PartialSuccess.is_success());
        assert!(!Passthrough.is_success());
    }
}
