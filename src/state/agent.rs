use crate::infra::{Action, Heading, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgentState {
    pub position: Position,
    pub heading: Heading,
}

impl AgentState {
    pub fn new(position: Position, heading: Heading) -> Self {
        Self { position, heading }
    }

    /// Cell directly in front of the agent.
    pub fn ahead(&self) -> Position {
        self.position.step(self.heading)
    }

    /// State after `action`, without any wall or bounds check.
    pub fn apply(&self, action: Action) -> AgentState {
        match action {
            Action::TurnLeft => AgentState::new(self.position, self.heading.turned_left()),
            Action::TurnRight => AgentState::new(self.position, self.heading.turned_right()),
            Action::MoveForward => AgentState::new(self.ahead(), self.heading),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_moves_along_heading() {
        let agent = AgentState::new(Position::new(1, 1), Heading::Right);
        let agent = agent.apply(Action::MoveForward);
        assert_eq!(agent.position, Position::new(2, 1));

        let agent = agent.apply(Action::TurnRight).apply(Action::MoveForward);
        assert_eq!(agent, AgentState::new(Position::new(2, 2), Heading::Down));
    }

    #[test]
    fn test_turns_keep_position() {
        let agent = AgentState::new(Position::new(0, 0), Heading::Up);
        let turned = agent.apply(Action::TurnLeft);
        assert_eq!(turned.position, agent.position);
        assert_eq!(turned.heading, Heading::Left);
    }
}
