mod composite_observer;
mod default_observer;
mod game_observer;
mod replay;
mod types;

pub use composite_observer::CompositeObserver;
pub use default_observer::DefaultObserver;
pub use game_observer::GameObserver;
pub use replay::ReplayFile;
pub use types::{Action, Heading, Position};
