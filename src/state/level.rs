use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::infra::{Heading, Position};
use crate::state::{AgentState, CellType, Grid};

/// Smallest field the generator can lay out (start column, goal column, one column between).
pub const MIN_GENERATED_SIZE: i32 = 3;

#[derive(Error, Debug)]
pub enum LevelError {
    #[error("failed to read level: {0}")]
    Io(#[from] std::io::Error),

    #[error("level is empty")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown cell symbol {symbol:?} at {position}")]
    UnknownSymbol { symbol: char, position: Position },

    #[error("level has no start cell")]
    MissingStart,

    #[error("level has no goal cell")]
    MissingGoal,

    #[error("level has more than one {0:?} cell")]
    Duplicate(CellType),

    #[error("cannot generate a {0}x{0} level, minimum size is {MIN_GENERATED_SIZE}")]
    TooSmall(i32),

    #[error("cannot generate a {0}x{0} level, the cell count overflows")]
    TooLarge(i32),
}

/// A grid together with the agent's starting state.
#[derive(Clone, Debug)]
pub struct Level {
    pub grid: Grid,
    pub start: AgentState,
    pub seed: Option<u64>,
}

impl Level {
    /// Parse a level from rows of cell symbols. The agent starts on `S` facing right.
    pub fn parse(text: &str) -> Result<Level, LevelError> {
        let rows: Vec<&str> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty())
            .collect();

        let Some(first) = rows.first() else {
            return Err(LevelError::Empty);
        };
        let width = first.chars().count();

        let mut grid = Grid::new(width as i32, rows.len() as i32);
        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(LevelError::RaggedRow {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, symbol) in row.chars().enumerate() {
                let position = Position::new(x as i32, y as i32);
                let cell = CellType::from_symbol(symbol)
                    .ok_or(LevelError::UnknownSymbol { symbol, position })?;
                grid.set(position, cell);
            }
        }

        for unique in [CellType::Start, CellType::Goal] {
            if grid.positions_of(unique).len() > 1 {
                return Err(LevelError::Duplicate(unique));
            }
        }
        grid.goal().ok_or(LevelError::MissingGoal)?;
        let start = grid.start().ok_or(LevelError::MissingStart)?;

        Ok(Level {
            grid,
            start: AgentState::new(start, Heading::Right),
            seed: None,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Level, LevelError> {
        let text = std::fs::read_to_string(path)?;
        Level::parse(&text)
    }

    /// Random square level: start on the left edge, goal on the right edge,
    /// roughly a fifth walls and a twentieth coins in between.
    pub fn generate(size: i32, seed: u64) -> Result<Level, LevelError> {
        if size < MIN_GENERATED_SIZE {
            return Err(LevelError::TooSmall(size));
        }
        let cells = size.checked_mul(size).ok_or(LevelError::TooLarge(size))?;

        let mut rng = StdRng::seed_from_u64(seed);
        let mut grid = Grid::new(size, size);

        let start = Position::new(0, rng.random_range(1..size - 1));
        grid.set(start, CellType::Start);

        let goal = Position::new(size - 1, rng.random_range(1..size - 1));
        grid.set(goal, CellType::Goal);

        let wall_attempts = cells / 5;
        scatter(&mut grid, &mut rng, CellType::Wall, wall_attempts);

        let coin_attempts = cells / 20;
        scatter(&mut grid, &mut rng, CellType::Coin, coin_attempts);

        tracing::debug!(
            size,
            seed,
            walls = grid.positions_of(CellType::Wall).len(),
            coins = grid.coins().len(),
            "Generated level"
        );

        Ok(Level {
            grid,
            start: AgentState::new(start, Heading::Right),
            seed: Some(seed),
        })
    }

    pub fn goal(&self) -> Option<Position> {
        self.grid.goal()
    }

    pub fn pickups(&self) -> Vec<Position> {
        self.grid.coins()
    }
}

/// Place `cell` on up to `attempts` random empty cells between the edge columns.
fn scatter(grid: &mut Grid, rng: &mut StdRng, cell: CellType, attempts: i32) {
    let size = grid.width;
    for _ in 0..attempts {
        let pos = Position::new(rng.random_range(1..size - 1), rng.random_range(0..size));
        if grid.get(&pos) == Some(CellType::Empty) {
            grid.set(pos, cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_finds_start_goal_and_coins() {
        let level = Level::parse(
            "S..C\n\
             .##.\n\
             C..G\n",
        )
        .unwrap();

        assert_eq!(level.grid.width, 4);
        assert_eq!(level.grid.height, 3);
        assert_eq!(level.start, AgentState::new(Position::new(0, 0), Heading::Right));
        assert_eq!(level.goal(), Some(Position::new(3, 2)));
        assert_eq!(level.pickups(), vec![Position::new(0, 2), Position::new(3, 0)]);
        assert_eq!(level.grid.get(&Position::new(1, 1)), Some(CellType::Wall));
    }

    #[test]
    fn test_parse_rejects_ragged_rows() {
        let err = Level::parse("S..\n..\n..G\n").unwrap_err();
        assert!(matches!(
            err,
            LevelError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn test_parse_requires_start_and_goal() {
        assert!(matches!(Level::parse("...\n..G\n"), Err(LevelError::MissingStart)));
        assert!(matches!(Level::parse("S..\n...\n"), Err(LevelError::MissingGoal)));
        assert!(matches!(
            Level::parse("S.S\n..G\n"),
            Err(LevelError::Duplicate(CellType::Start))
        ));
        assert!(matches!(Level::parse("\n\n"), Err(LevelError::Empty)));
    }

    #[test]
    fn test_parse_rejects_unknown_symbols() {
        let err = Level::parse("S.x\n..G\n").unwrap_err();
        match err {
            LevelError::UnknownSymbol { symbol, position } => {
                assert_eq!(symbol, 'x');
                assert_eq!(position, Position::new(2, 0));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_generate_is_deterministic_per_seed() {
        let a = Level::generate(18, 42).unwrap();
        let b = Level::generate(18, 42).unwrap();
        assert_eq!(a.grid, b.grid);
        assert_eq!(a.start, b.start);
    }

    #[test]
    fn test_generate_places_start_and_goal_on_edges() {
        for seed in 0..20 {
            let level = Level::generate(18, seed).unwrap();
            let goal = level.goal().unwrap();

            assert_eq!(level.start.position.x, 0);
            assert!((1..17).contains(&level.start.position.y));
            assert_eq!(goal.x, 17);
            assert!((1..17).contains(&goal.y));
            assert_eq!(level.grid.get(&level.start.position), Some(CellType::Start));

            for pos in level.grid.positions_of(CellType::Wall) {
                assert!(pos.x >= 1 && pos.x <= 16, "wall outside inner columns: {pos}");
            }
        }
    }

    #[test]
    fn test_generate_rejects_tiny_sizes() {
        assert!(matches!(Level::generate(2, 1), Err(LevelError::TooSmall(2))));
    }

    #[test]
    fn test_generate_rejects_sizes_whose_cell_count_overflows() {
        assert!(matches!(
            Level::generate(46_341, 1),
            Err(LevelError::TooLarge(46_341))
        ));
        assert!(matches!(
            Level::generate(i32::MAX, 1),
            Err(LevelError::TooLarge(_))
        ));
    }
}
