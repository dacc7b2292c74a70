use crate::planners::{Plan, PlanError};
use crate::program::{BasicCommand, StepOutcome};
use crate::state::{Level, Session};

/// Trait for observing playback events
pub trait GameObserver {
    /// Called before the first action of a run
    fn on_level_start(&mut self, level: &Level);

    /// Called when the planner produced a complete plan
    fn on_plan_ready(&mut self, plan: &Plan);

    /// Called when planning failed; a partial plan may still be played
    fn on_plan_failed(&mut self, error: &PlanError);

    /// Called after every command applied to the session
    fn on_action_applied(
        &mut self,
        step: usize,
        command: BasicCommand,
        outcome: StepOutcome,
        session: &Session,
    );

    /// Called when a coin was picked up
    fn on_coin_collected(&mut self, _session: &Session) {
        // Default implementation does nothing
    }

    /// Called when a forward move ran into a wall or the field edge
    fn on_move_blocked(&mut self, _step: usize, _session: &Session) {
        // Default implementation does nothing
    }

    /// Called once the run is over
    fn on_finished(&mut self, session: &Session);
}
