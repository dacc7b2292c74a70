use std::fmt;

use thiserror::Error;

use crate::infra::{Action, Position};
use crate::state::{AgentState, Grid};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("action {step} ({action}) from {from} runs into {into}")]
    Blocked {
        step: usize,
        action: Action,
        from: Position,
        into: Position,
    },
}

/// Flat action sequence for one planning call.
///
/// Coins are collected implicitly by standing on them, so a plan only ever
/// turns and moves.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Plan {
    pub actions: Vec<Action>,
    /// Pickups in the order the plan reaches them.
    pub order: Vec<Position>,
    /// Pickups that had no path and were left out.
    pub skipped: Vec<Position>,
}

impl Plan {
    pub fn cost(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Compact form, one letter per action (`L`, `R`, `F`).
    pub fn letters(&self) -> String {
        self.actions.iter().map(|a| a.letter()).collect()
    }

    /// Agent states after each action, starting with `start`.
    pub fn trace(&self, grid: &Grid, start: AgentState) -> Result<Vec<AgentState>, PlaybackError> {
        let mut states = Vec::with_capacity(self.actions.len() + 1);
        states.push(start);
        let mut agent = start;
        for (step, &action) in self.actions.iter().enumerate() {
            let next = agent.apply(action);
            if !grid.is_walkable(&next.position) {
                return Err(PlaybackError::Blocked {
                    step,
                    action,
                    from: agent.position,
                    into: next.position,
                });
            }
            agent = next;
            states.push(agent);
        }
        Ok(states)
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} actions [{}]", self.cost(), self.letters())
    }
}
