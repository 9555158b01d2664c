//! Pipeline state machine.

use std::fmt;

use serde::Serialize;

use crate::constants::phases;

/// Where a pipeline run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    /// Run created, not yet started.
    Idle,
    /// Loading the source and computing boundaries.
    Planning,
    /// Running the codec engine once per segment.
    Extracting,
    /// Building the archive.
    Packaging,
    /// Handing the archive to the delivery collaborator.
    Delivering,
    /// Finished successfully.
    Done,
    /// Stopped by a failure or cancellation.
    Aborted,
}

impl PipelineState {
    /// Whether the run can move from `self` to `next`.
    ///
    /// Forward steps go one stage at a time. `Aborted` is reachable from
    /// every stage that has started work and not yet finished.
    pub fn can_transition_to(self, next: Self) -> bool {
        use PipelineState::{Aborted, Delivering, Done, Extracting, Idle, Packaging, Planning};

        matches!(
            (self, next),
            (Idle, Planning)
                | (Planning, Extracting)
                | (Extracting, Packaging)
                | (Packaging, Delivering)
                | (Delivering, Done)
                | (Planning | Extracting | Packaging | Delivering, Aborted)
        )
    }

    /// Whether the run has ended.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    /// Phase label reported when the run enters this state.
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => phases::IDLE,
            Self::Planning => phases::PLANNING,
            Self::Extracting => phases::EXTRACTING,
            Self::Packaging => phases::PACKAGING,
            Self::Delivering => phases::DELIVERING,
            Self::Done => phases::DONE,
            Self::Aborted => phases::ABORTED,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Planning => "planning",
            Self::Extracting => "extracting",
            Self::Packaging => "packaging",
            Self::Delivering => "delivering",
            Self::Done => "done",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}
