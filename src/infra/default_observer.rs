use std::io::{self, Write};

use tracing::{info, warn};

use crate::infra::GameObserver;
use crate::planners::{Plan, PlanError};
use crate::program::{BasicCommand, Program, StepOutcome};
use crate::state::{Level, Session};

/// Logs every event and prints the field after each step.
pub struct DefaultObserver;

impl GameObserver for DefaultObserver {
    fn on_level_start(&mut self, level: &Level) {
        info!("Level started");
        if let Some(seed) = level.seed {
            info!("- seed: {}", seed);
        }
        info!("- map size: {}x{}", level.grid.width, level.grid.height);
        info!("- coins: {}", level.pickups().len());
        info!(
            "- start: {} facing {}",
            level.start.position,
            level.start.heading.name()
        );

        let map = level.grid.draw_ascii_map(Some(&level.start));
        let _ = writeln!(io::stdout(), "{}", map);
    }

    fn on_plan_ready(&mut self, plan: &Plan) {
        info!("Plan ready: {}", plan);
        for pickup in &plan.skipped {
            info!("Skipping unreachable coin at {}", pickup);
        }

        let program = Program::from_actions(&plan.actions);
        let _ = writeln!(io::stdout(), "{}", program);
    }

    fn on_plan_failed(&mut self, error: &PlanError) {
        warn!("Planning failed: {}", error);
    }

    fn on_action_applied(
        &mut self,
        step: usize,
        command: BasicCommand,
        _outcome: StepOutcome,
        session: &Session,
    ) {
        let agent = session.agent();
        info!(
            "step: {}, command: {:?}, pos: {}, facing: {}, coins: {}/{}",
            step,
            command,
            agent.position,
            agent.heading.name(),
            session.collected_coins,
            session.total_coins,
        );

        let map = session.draw_ascii_map();
        let _ = writeln!(io::stdout(), "{}", map);
    }

    fn on_coin_collected(&mut self, session: &Session) {
        info!(
            "Coin collected at {} ({}/{})",
            session.agent().position,
            session.collected_coins,
            session.total_coins
        );
    }

    fn on_move_blocked(&mut self, step: usize, session: &Session) {
        warn!(
            "step {}: move blocked at {} facing {}",
            step,
            session.agent().position,
            session.agent().heading.name()
        );
    }

    fn on_finished(&mut self, session: &Session) {
        if session.is_won() {
            info!("\nLevel solved!");
        } else {
            info!("\nLevel not solved");
        }
        info!("Coins: {}/{}", session.collected_coins, session.total_coins);
        info!("Moves: {}", session.steps);
    }
}
