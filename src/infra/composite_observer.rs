use crate::infra::GameObserver;
use crate::planners::{Plan, PlanError};
use crate::program::{BasicCommand, StepOutcome};
use crate::state::{Level, Session};

/// Fans every event out to a list of observers, in insertion order.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Box<dyn GameObserver>>,
}

impl CompositeObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, observer: impl GameObserver + 'static) {
        self.observers.push(Box::new(observer));
    }
}

impl GameObserver for CompositeObserver {
    fn on_level_start(&mut self, level: &Level) {
        for observer in &mut self.observers {
            observer.on_level_start(level);
        }
    }

    fn on_plan_ready(&mut self, plan: &Plan) {
        for observer in &mut self.observers {
            observer.on_plan_ready(plan);
        }
    }

    fn on_plan_failed(&mut self, error: &PlanError) {
        for observer in &mut self.observers {
            observer.on_plan_failed(error);
        }
    }

    fn on_action_applied(
        &mut self,
        step: usize,
        command: BasicCommand,
        outcome: StepOutcome,
        session: &Session,
    ) {
        for observer in &mut self.observers {
            observer.on_action_applied(step, command, outcome, session);
        }
    }

    fn on_coin_collected(&mut self, session: &Session) {
        for observer in &mut self.observers {
            observer.on_coin_collected(session);
        }
    }

    fn on_move_blocked(&mut self, step: usize, session: &Session) {
        for observer in &mut self.observers {
            observer.on_move_blocked(step, session);
        }
    }

    fn on_finished(&mut self, session: &Session) {
        for observer in &mut self.observers {
            observer.on_finished(session);
        }
    }
}
