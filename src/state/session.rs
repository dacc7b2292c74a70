use crate::infra::Action;
use crate::state::{AgentState, CellType, Grid, Level};

/// What happened when an action was applied to the live world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Turned,
    Moved { collected: bool },
    /// The cell ahead is a wall or off the field; the agent did not move.
    Blocked,
}

/// Live playback world: its own copy of the field, the agent and the score.
#[derive(Debug, Clone)]
pub struct Session {
    grid: Grid,
    agent: AgentState,
    auto_collect: bool,
    pub collected_coins: usize,
    pub total_coins: usize,
    /// Coins the agent can walk to from the start without entering the goal.
    pub reachable_coins: usize,
    pub steps: usize,
}

impl Session {
    /// With `auto_collect` a coin is picked up as soon as the agent stands on it,
    /// otherwise only an explicit collect does.
    pub fn new(level: &Level, auto_collect: bool) -> Self {
        let reachable = level
            .grid
            .reachable_from(level.start.position, level.goal());
        let reachable_coins = level
            .pickups()
            .into_iter()
            .filter(|coin| reachable.contains(coin))
            .count();

        let mut session = Self {
            grid: level.grid.clone(),
            agent: level.start,
            auto_collect,
            collected_coins: 0,
            total_coins: level.grid.coins().len(),
            reachable_coins,
            steps: 0,
        };
        if auto_collect {
            session.collect_coin();
        }
        session
    }

    pub fn agent(&self) -> &AgentState {
        &self.agent
    }

    pub fn apply(&mut self, action: Action) -> MoveOutcome {
        self.steps += 1;
        match action {
            Action::TurnLeft | Action::TurnRight => {
                self.agent = self.agent.apply(action);
                MoveOutcome::Turned
            }
            Action::MoveForward => {
                if self.wall_ahead() {
                    tracing::debug!(position = %self.agent.position, "Move blocked");
                    return MoveOutcome::Blocked;
                }
                self.agent = self.agent.apply(action);
                let collected = self.auto_collect && self.collect_coin();
                MoveOutcome::Moved { collected }
            }
        }
    }

    /// Pick up the coin under the agent, if there is one.
    pub fn collect_coin(&mut self) -> bool {
        if !self.on_coin() {
            return false;
        }
        self.grid.set(self.agent.position, CellType::Empty);
        self.collected_coins += 1;
        true
    }

    pub fn wall_ahead(&self) -> bool {
        !self.grid.is_walkable(&self.agent.ahead())
    }

    pub fn on_coin(&self) -> bool {
        self.grid.get(&self.agent.position) == Some(CellType::Coin)
    }

    pub fn at_goal(&self) -> bool {
        self.grid.get(&self.agent.position) == Some(CellType::Goal)
    }

    /// Walled-off coins do not count against the player.
    pub fn reachable_coins_collected(&self) -> bool {
        self.collected_coins >= self.reachable_coins
    }

    /// Standing on the goal with every reachable coin collected.
    pub fn is_won(&self) -> bool {
        self.at_goal() && self.reachable_coins_collected()
    }

    pub fn draw_ascii_map(&self) -> String {
        self.grid.draw_ascii_map(Some(&self.agent))
    }
}
