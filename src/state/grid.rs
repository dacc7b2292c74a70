use std::collections::{HashSet, VecDeque};

use crate::infra::{Heading, Position};
use crate::state::AgentState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellType {
    #[default]
    Empty,
    Wall,
    Coin,
    Goal,
    Start,
}

impl CellType {
    pub fn symbol(self) -> char {
        match self {
            CellType::Empty => '.',
            CellType::Wall => '#',
            CellType::Coin => 'C',
            CellType::Goal => 'G',
            CellType::Start => 'S',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<CellType> {
        match symbol {
            '.' | ' ' => Some(CellType::Empty),
            '#' => Some(CellType::Wall),
            'C' => Some(CellType::Coin),
            'G' => Some(CellType::Goal),
            'S' => Some(CellType::Start),
            _ => None,
        }
    }
}

/// Fixed-size snapshot of the playing field.
///
/// The planner only ever borrows a `Grid`; the live world used during playback
/// keeps its own copy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    cells: Vec<CellType>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![CellType::Empty; width as usize * height as usize],
        }
    }

    fn index(&self, pos: &Position) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    pub fn in_bounds(&self, pos: &Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    pub fn get(&self, pos: &Position) -> Option<CellType> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Out-of-bounds writes are ignored.
    pub fn set(&mut self, pos: Position, cell: CellType) {
        if let Some(i) = self.index(&pos) {
            self.cells[i] = cell;
        }
    }

    pub fn is_walkable(&self, pos: &Position) -> bool {
        matches!(self.get(pos), Some(cell) if cell != CellType::Wall)
    }

    /// Cells in column-major order: x outer, y inner.
    pub fn iter(&self) -> impl Iterator<Item = (Position, CellType)> + '_ {
        (0..self.width).flat_map(move |x| {
            (0..self.height).map(move |y| {
                let pos = Position::new(x, y);
                (pos, self.cells[y as usize * self.width as usize + x as usize])
            })
        })
    }

    pub fn positions_of(&self, cell: CellType) -> Vec<Position> {
        self.iter()
            .filter(|(_, c)| *c == cell)
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Cells connected to `start` by walkable steps, never passing `blocked`.
    pub fn reachable_from(&self, start: Position, blocked: Option<Position>) -> HashSet<Position> {
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(pos) = queue.pop_front() {
            for next in pos.neighbors() {
                if Some(next) == blocked || !self.is_walkable(&next) {
                    continue;
                }
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    pub fn coins(&self) -> Vec<Position> {
        self.positions_of(CellType::Coin)
    }

    pub fn goal(&self) -> Option<Position> {
        self.iter().find(|(_, c)| *c == CellType::Goal).map(|(pos, _)| pos)
    }

    pub fn start(&self) -> Option<Position> {
        self.iter().find(|(_, c)| *c == CellType::Start).map(|(pos, _)| pos)
    }

    /// Plain text form, one row per line, using the cell symbols.
    pub fn to_ascii(&self) -> String {
        let mut output = String::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = self.cells[y as usize * self.width as usize + x as usize];
                output.push(cell.symbol());
            }
            output.push('\n');
        }
        output
    }

    pub fn draw_ascii_map(&self, agent: Option<&AgentState>) -> String {
        let mut output = String::new();

        // ANSI color codes
        const RESET: &str = "\x1b[0m";
        const AGENT: &str = "\x1b[1;33m"; // Bright yellow
        const WALL: &str = "\x1b[90m"; // Dark gray
        const GOAL: &str = "\x1b[1;32m"; // Bright green
        const COIN: &str = "\x1b[93m"; // Yellow
        const START: &str = "\x1b[94m"; // Bright blue

        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Position::new(x, y);

                if let Some(agent) = agent.filter(|a| a.position == pos) {
                    let arrow = match agent.heading {
                        Heading::Up => '^',
                        Heading::Right => '>',
                        Heading::Down => 'v',
                        Heading::Left => '<',
                    };
                    output.push_str(&format!("{}{}{}", AGENT, arrow, RESET));
                    continue;
                }

                let tile_str = match self.get(&pos) {
                    Some(CellType::Wall) => format!("{}█{}", WALL, RESET),
                    Some(CellType::Coin) => format!("{}o{}", COIN, RESET),
                    Some(CellType::Goal) => format!("{}G{}", GOAL, RESET),
                    Some(CellType::Start) => format!("{}S{}", START, RESET),
                    Some(CellType::Empty) | None => " ".to_string(),
                };
                output.push_str(&tile_str);
            }
            output.push('\n');
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_is_not_walkable() {
        let grid = Grid::new(3, 2);
        assert!(grid.is_walkable(&Position::new(2, 1)));
        assert!(!grid.is_walkable(&Position::new(3, 1)));
        assert!(!grid.is_walkable(&Position::new(0, -1)));
        assert_eq!(grid.get(&Position::new(-1, 0)), None);
    }

    #[test]
    fn test_coins_are_listed_column_major() {
        let mut grid = Grid::new(3, 3);
        grid.set(Position::new(2, 0), CellType::Coin);
        grid.set(Position::new(0, 2), CellType::Coin);
        grid.set(Position::new(0, 1), CellType::Coin);

        assert_eq!(
            grid.coins(),
            vec![Position::new(0, 1), Position::new(0, 2), Position::new(2, 0)]
        );
    }

    #[test]
    fn test_set_ignores_out_of_bounds() {
        let mut grid = Grid::new(2, 2);
        grid.set(Position::new(5, 5), CellType::Wall);
        assert!(grid.positions_of(CellType::Wall).is_empty());
    }

    #[test]
    fn test_reachable_from_stops_at_walls_and_blocked_cell() {
        let mut grid = Grid::new(5, 1);
        grid.set(Position::new(3, 0), CellType::Wall);

        let open = grid.reachable_from(Position::new(0, 0), None);
        assert_eq!(open.len(), 3);
        assert!(!open.contains(&Position::new(4, 0)));

        let gated = grid.reachable_from(Position::new(0, 0), Some(Position::new(1, 0)));
        assert_eq!(gated, HashSet::from([Position::new(0, 0)]));
    }

    #[test]
    fn test_ascii_rows_follow_y() {
        let mut grid = Grid::new(3, 2);
        grid.set(Position::new(0, 0), CellType::Start);
        grid.set(Position::new(1, 1), CellType::Wall);
        grid.set(Position::new(2, 1), CellType::Goal);

        assert_eq!(grid.to_ascii(), "S..\n.#G\n");
        assert_eq!(grid.goal(), Some(Position::new(2, 1)));
        assert_eq!(grid.start(), Some(Position::new(0, 0)));
    }
}
