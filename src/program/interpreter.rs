use crate::program::{BasicCommand, Command, Program, ProgramError, RepeatCondition};
use crate::state::{MoveOutcome, Session};

/// Result of running one basic command against the live world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved(MoveOutcome),
    Collected,
    NothingToCollect,
}

pub fn execute(session: &mut Session, command: BasicCommand) -> StepOutcome {
    match command.action() {
        Some(action) => StepOutcome::Moved(session.apply(action)),
        None if session.collect_coin() => StepOutcome::Collected,
        None => StepOutcome::NothingToCollect,
    }
}

/// Walks a program one basic command at a time, reading the session's
/// sensors to decide repeats.
pub struct Interpreter<'p> {
    program: &'p Program,
    pc: usize,
    repeat_count: u32,
    executed: usize,
    step_limit: usize,
}

impl<'p> Interpreter<'p> {
    pub fn new(program: &'p Program, step_limit: usize) -> Self {
        Self {
            program,
            pc: 0,
            repeat_count: 0,
            executed: 0,
            step_limit,
        }
    }

    pub fn executed(&self) -> usize {
        self.executed
    }

    /// Next command to execute, `None` once the program is done.
    pub fn next_step(&mut self, session: &Session) -> Result<Option<BasicCommand>, ProgramError> {
        while let Some(command) = self.program.commands.get(self.pc) {
            match *command {
                Command::Basic(basic) => {
                    self.advance();
                    return self.emit(basic).map(Some);
                }
                Command::Repeat { until, body } => {
                    let keep_going = match until {
                        RepeatCondition::UntilWall => !session.wall_ahead(),
                        RepeatCondition::UntilCoin => !session.on_coin(),
                        RepeatCondition::UntilGoal => !session.at_goal(),
                        RepeatCondition::Times(n) => self.repeat_count < n,
                    };
                    if keep_going {
                        self.repeat_count += 1;
                        return self.emit(body).map(Some);
                    }
                    self.advance();
                }
            }
        }
        Ok(None)
    }

    /// Run to completion without any delay between steps.
    pub fn run(&mut self, session: &mut Session) -> Result<Vec<StepOutcome>, ProgramError> {
        let mut outcomes = Vec::new();
        while let Some(command) = self.next_step(session)? {
            outcomes.push(execute(session, command));
        }
        Ok(outcomes)
    }

    fn advance(&mut self) {
        self.pc += 1;
        self.repeat_count = 0;
    }

    fn emit(&mut self, command: BasicCommand) -> Result<BasicCommand, ProgramError> {
        if self.executed >= self.step_limit {
            return Err(ProgramError::StepLimitExceeded {
                limit: self.step_limit,
            });
        }
        self.executed += 1;
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{Heading, Position};
    use crate::state::Level;

    fn corridor() -> Level {
        Level::parse(
            "S..C.G\n\
             ######\n",
        )
        .unwrap()
    }

    #[test]
    fn test_repeat_until_coin_then_collect() {
        let level = corridor();
        let program: Program = "repeat until coin: forward\ncollect\nrepeat until goal: forward\n"
            .parse()
            .unwrap();
        let mut session = Session::new(&level, false);

        let outcomes = Interpreter::new(&program, 100).run(&mut session).unwrap();

        assert_eq!(outcomes.len(), 6);
        assert_eq!(outcomes[3], StepOutcome::Collected);
        assert!(session.is_won());
    }

    #[test]
    fn test_repeat_until_wall_stops_before_wall() {
        let level = corridor();
        let program: Program = "repeat until wall: forward\n".parse().unwrap();
        let mut session = Session::new(&level, true);

        Interpreter::new(&program, 100).run(&mut session).unwrap();

        assert_eq!(session.agent().position, Position::new(5, 0));
        assert_eq!(session.collected_coins, 1);
    }

    #[test]
    fn test_repeat_times_counts_per_block() {
        let level = corridor();
        let program: Program = "repeat 2: right\nrepeat 2: right\n".parse().unwrap();
        let mut session = Session::new(&level, true);

        let outcomes = Interpreter::new(&program, 100).run(&mut session).unwrap();

        assert_eq!(outcomes.len(), 4);
        assert_eq!(session.agent().heading, Heading::Right);
    }

    #[test]
    fn test_repeat_until_goal_on_unreachable_goal_is_limited() {
        let level = Level::parse("S#G\n").unwrap();
        let program: Program = "repeat until goal: forward\n".parse().unwrap();
        let mut session = Session::new(&level, true);

        let err = Interpreter::new(&program, 25).run(&mut session).unwrap_err();
        assert!(matches!(err, ProgramError::StepLimitExceeded { limit: 25 }));
        assert_eq!(session.steps, 25);
    }

    #[test]
    fn test_collect_on_empty_cell_is_reported() {
        let level = corridor();
        let program: Program = "collect\n".parse().unwrap();
        let mut session = Session::new(&level, false);
        let outcomes = Interpreter::new(&program, 10).run(&mut session).unwrap();
        assert_eq!(outcomes, vec![StepOutcome::NothingToCollect]);
    }
}
