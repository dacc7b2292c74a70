use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::infra::Action;
use crate::program::ProgramError;

/// Largest count a `repeat n` block accepts.
pub const MAX_REPEAT_COUNT: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicCommand {
    MoveForward,
    TurnLeft,
    TurnRight,
    CollectCoin,
}

impl BasicCommand {
    /// The plan action this command performs, if it is a movement.
    pub fn action(self) -> Option<Action> {
        match self {
            BasicCommand::MoveForward => Some(Action::MoveForward),
            BasicCommand::TurnLeft => Some(Action::TurnLeft),
            BasicCommand::TurnRight => Some(Action::TurnRight),
            BasicCommand::CollectCoin => None,
        }
    }

    /// Replay letter: the action letter, or `C` for collect.
    pub fn letter(self) -> char {
        self.action().map_or('C', Action::letter)
    }

    fn keyword(self) -> &'static str {
        match self {
            BasicCommand::MoveForward => "forward",
            BasicCommand::TurnLeft => "left",
            BasicCommand::TurnRight => "right",
            BasicCommand::CollectCoin => "collect",
        }
    }

    fn from_keyword(word: &str) -> Option<BasicCommand> {
        match word {
            "forward" => Some(BasicCommand::MoveForward),
            "left" => Some(BasicCommand::TurnLeft),
            "right" => Some(BasicCommand::TurnRight),
            "collect" => Some(BasicCommand::CollectCoin),
            _ => None,
        }
    }
}

impl From<Action> for BasicCommand {
    fn from(action: Action) -> Self {
        match action {
            Action::MoveForward => BasicCommand::MoveForward,
            Action::TurnLeft => BasicCommand::TurnLeft,
            Action::TurnRight => BasicCommand::TurnRight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepeatCondition {
    UntilWall,
    UntilCoin,
    UntilGoal,
    Times(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Basic(BasicCommand),
    /// Runs `body` while the condition does not hold, checked before every run.
    Repeat {
        until: RepeatCondition,
        body: BasicCommand,
    },
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Basic(basic) => f.write_str(basic.keyword()),
            Command::Repeat { until, body } => match until {
                RepeatCondition::UntilWall => write!(f, "repeat until wall: {}", body.keyword()),
                RepeatCondition::UntilCoin => write!(f, "repeat until coin: {}", body.keyword()),
                RepeatCondition::UntilGoal => write!(f, "repeat until goal: {}", body.keyword()),
                RepeatCondition::Times(n) => write!(f, "repeat {}: {}", n, body.keyword()),
            },
        }
    }
}

/// An ordered list of commands, one per line in text form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    pub commands: Vec<Command>,
}

impl Program {
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Program, ProgramError> {
        std::fs::read_to_string(path)?.parse()
    }

    /// Block program for a plan, folding runs of forward moves into repeats.
    pub fn from_actions(actions: &[Action]) -> Program {
        let mut commands = Vec::new();
        let mut index = 0;
        while index < actions.len() {
            let action = actions[index];
            let run = actions[index..]
                .iter()
                .take_while(|&&a| a == action)
                .count();

            if action == Action::MoveForward && run > 1 {
                let mut remaining = run as u32;
                while remaining > 0 {
                    let chunk = remaining.min(MAX_REPEAT_COUNT);
                    commands.push(if chunk == 1 {
                        Command::Basic(BasicCommand::MoveForward)
                    } else {
                        Command::Repeat {
                            until: RepeatCondition::Times(chunk),
                            body: BasicCommand::MoveForward,
                        }
                    });
                    remaining -= chunk;
                }
            } else {
                commands.extend((0..run).map(|_| Command::Basic(action.into())));
            }
            index += run;
        }
        Program { commands }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for command in &self.commands {
            writeln!(f, "{}", command)?;
        }
        Ok(())
    }
}

impl FromStr for Program {
    type Err = ProgramError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut commands = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let content = raw.split("//").next().unwrap_or("").trim().to_ascii_lowercase();
            if content.is_empty() {
                continue;
            }
            commands.push(parse_command(&content, line)?);
        }
        Ok(Program { commands })
    }
}

fn parse_command(content: &str, line: usize) -> Result<Command, ProgramError> {
    let unknown = || ProgramError::UnknownCommand {
        line,
        text: content.to_string(),
    };

    let Some(rest) = content.strip_prefix("repeat") else {
        return BasicCommand::from_keyword(content)
            .map(Command::Basic)
            .ok_or_else(unknown);
    };

    let (head, body) = rest.split_once(':').ok_or_else(unknown)?;
    let body = BasicCommand::from_keyword(body.trim()).ok_or_else(unknown)?;
    let head = head.trim();

    let until = match head {
        "until wall" => RepeatCondition::UntilWall,
        "until coin" => RepeatCondition::UntilCoin,
        "until goal" => RepeatCondition::UntilGoal,
        count => {
            let count: u32 = count.parse().map_err(|_| unknown())?;
            if count == 0 || count > MAX_REPEAT_COUNT {
                return Err(ProgramError::RepeatCountOutOfRange { line, count });
            }
            RepeatCondition::Times(count)
        }
    };

    Ok(Command::Repeat { until, body })
}
