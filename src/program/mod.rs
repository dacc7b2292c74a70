//! Block programs: plain command lists interpreted against a live session.

mod command;
mod interpreter;

use thiserror::Error;

pub use command::{BasicCommand, Command, MAX_REPEAT_COUNT, Program, RepeatCondition};
pub use interpreter::{Interpreter, StepOutcome, execute};

#[derive(Error, Debug)]
pub enum ProgramError {
    #[error("failed to read program: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: unknown command {text:?}")]
    UnknownCommand { line: usize, text: String },

    #[error("line {line}: repeat count {count} is outside 1..={MAX_REPEAT_COUNT}")]
    RepeatCountOutOfRange { line: usize, count: u32 },

    #[error("program did not finish within {limit} steps")]
    StepLimitExceeded { limit: usize },
}
