pub mod config;
pub mod game;
pub mod infra;
pub mod planners;
pub mod program;
pub mod state;

// Re-export commonly used types for convenience
pub use config::Config;
pub use game::{Game, GameSummary};
pub use infra::{Action, Heading, Position};
pub use planners::{PathPlanner, Plan, PlanError};
pub use program::Program;
pub use state::{Grid, Level};
