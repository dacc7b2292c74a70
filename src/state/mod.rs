mod agent;
mod grid;
mod level;
mod session;

pub use agent::AgentState;
pub use grid::{CellType, Grid};
pub use level::{Level, LevelError, MIN_GENERATED_SIZE};
pub use session::{MoveOutcome, Session};
