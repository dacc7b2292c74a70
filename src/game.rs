use std::time::Duration;

use tokio::time::{Instant, sleep};

use crate::infra::{Action, GameObserver};
use crate::planners::{PathPlanner, Plan, PlanError};
use crate::program::{BasicCommand, Interpreter, Program, ProgramError, StepOutcome, execute};
use crate::state::{AgentState, Level, MoveOutcome, Session};

/// Commands a block program may run before it is stopped.
pub const DEFAULT_STEP_LIMIT: usize = 1000;

/// Score of one finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSummary {
    pub won: bool,
    pub collected_coins: usize,
    pub total_coins: usize,
    pub moves: usize,
    pub final_state: AgentState,
    pub elapsed: Duration,
}

/// Plays plans and programs against a fresh session of one level, pausing
/// `delay` after every command.
pub struct Game {
    level: Level,
    observer: Box<dyn GameObserver>,
    delay: Duration,
    step_limit: usize,
    started: Option<Instant>,
}

impl Game {
    pub fn new(level: Level, observer: impl GameObserver + 'static, delay: Duration) -> Self {
        Self {
            level,
            observer: Box::new(observer),
            delay,
            step_limit: DEFAULT_STEP_LIMIT,
            started: None,
        }
    }

    pub fn with_step_limit(mut self, step_limit: usize) -> Self {
        self.step_limit = step_limit;
        self
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Plan the level and play the result. When the goal is unreachable the
    /// partial plan is still played before the error is returned.
    pub async fn plan_and_run(&mut self, planner: &PathPlanner) -> Result<GameSummary, PlanError> {
        match planner.plan_level(&self.level) {
            Ok(plan) => Ok(self.run_plan(&plan).await),
            Err(error) => {
                self.start();
                self.observer.on_plan_failed(&error);
                if let Some(partial) = error.partial_plan() {
                    tracing::info!("Playing partial plan of {} actions", partial.cost());
                    self.play_actions(&partial.actions).await;
                }
                Err(error)
            }
        }
    }

    pub async fn run_plan(&mut self, plan: &Plan) -> GameSummary {
        self.start();
        self.observer.on_plan_ready(plan);
        self.play_actions(&plan.actions).await
    }

    /// Run a block program. Coins are only picked up by explicit collects.
    pub async fn run_program(&mut self, program: &Program) -> Result<GameSummary, ProgramError> {
        self.start();
        tracing::info!("Running program of {} commands", program.commands.len());

        let mut session = Session::new(&self.level, false);
        let mut interpreter = Interpreter::new(program, self.step_limit);
        loop {
            let command = match interpreter.next_step(&session) {
                Ok(Some(command)) => command,
                Ok(None) => break,
                Err(e) => {
                    self.finish(&session);
                    return Err(e);
                }
            };
            let outcome = execute(&mut session, command);
            self.report(interpreter.executed(), command, outcome, &session);
            self.pause().await;
        }
        Ok(self.finish(&session))
    }

    async fn play_actions(&mut self, actions: &[Action]) -> GameSummary {
        let mut session = Session::new(&self.level, true);
        for (index, &action) in actions.iter().enumerate() {
            let outcome = StepOutcome::Moved(session.apply(action));
            self.report(index + 1, action.into(), outcome, &session);
            self.pause().await;
        }
        self.finish(&session)
    }

    fn start(&mut self) {
        self.started = Some(Instant::now());
        self.observer.on_level_start(&self.level);
    }

    fn report(&mut self, step: usize, command: BasicCommand, outcome: StepOutcome, session: &Session) {
        self.observer.on_action_applied(step, command, outcome, session);
        match outcome {
            StepOutcome::Collected | StepOutcome::Moved(MoveOutcome::Moved { collected: true }) => {
                self.observer.on_coin_collected(session)
            }
            StepOutcome::Moved(MoveOutcome::Blocked) => self.observer.on_move_blocked(step, session),
            _ => {}
        }
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }

    fn finish(&mut self, session: &Session) -> GameSummary {
        self.observer.on_finished(session);
        GameSummary {
            won: session.is_won(),
            collected_coins: session.collected_coins,
            total_coins: session.total_coins,
            moves: session.steps,
            final_state: *session.agent(),
            elapsed: self.started.map(|t| t.elapsed()).unwrap_or_default(),
        }
    }
}
