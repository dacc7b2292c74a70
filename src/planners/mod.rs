mod joint;
mod plan;
mod planner;
mod segment;
mod tour;

use thiserror::Error;

use crate::infra::Position;

pub use joint::{JointRoute, JointSearch, MAX_JOINT_PICKUPS};
pub use plan::{Plan, PlaybackError};
pub use planner::{PathPlanner, PlannerConfig, Strategy, UnknownStrategy};
pub use segment::{Segment, SegmentSearch};
pub use tour::{CoinTourPlanner, Tour};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// The goal has no path. `partial` holds the pickup segments already planned.
    #[error("no route to goal {goal} (partial plan: {partial})")]
    NoRouteFound { goal: Position, partial: Plan },

    /// Informational: the pickup is walled off and gets skipped.
    #[error("pickup at {0} is unreachable, skipping")]
    UnreachablePickup(Position),

    #[error("{count} pickups exceed the joint search limit of {limit}")]
    TooManyPickups { count: usize, limit: usize },

    #[error("level has no goal cell")]
    MissingGoal,
}

impl PlanError {
    /// Actions that can still be replayed after a failure.
    pub fn partial_plan(&self) -> Option<&Plan> {
        match self {
            PlanError::NoRouteFound { partial, .. } => Some(partial),
            _ => None,
        }
    }
}
