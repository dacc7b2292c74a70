use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// The neighbouring cell one step in `heading`.
    pub fn step(&self, heading: Heading) -> Position {
        let (dx, dy) = heading.delta();
        Position::new(self.x + dx, self.y + dy)
    }

    pub fn neighbors(&self) -> [Position; 4] {
        Heading::ALL.map(|heading| self.step(heading))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal heading of the agent, encoded 0..=3 clockwise from Up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Heading {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Heading {
    pub const ALL: [Heading; 4] = [Heading::Up, Heading::Right, Heading::Down, Heading::Left];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Heading {
        Self::ALL[index % 4]
    }

    pub fn turned_left(self) -> Heading {
        Heading::from_index(self.index() + 3)
    }

    pub fn turned_right(self) -> Heading {
        Heading::from_index(self.index() + 1)
    }

    /// Number of 90° turns needed to face `other`, either way round.
    pub fn rotation_distance(self, other: Heading) -> u32 {
        let diff = (self.index() as i32 - other.index() as i32).unsigned_abs();
        diff.min(4 - diff)
    }

    /// Turn actions that rotate `self` onto `target`. A half turn is two right turns.
    pub fn turns_to(self, target: Heading) -> Vec<Action> {
        match (target.index() + 4 - self.index()) % 4 {
            0 => Vec::new(),
            1 => vec![Action::TurnRight],
            2 => vec![Action::TurnRight, Action::TurnRight],
            _ => vec![Action::TurnLeft],
        }
    }

    /// Unit step `(dx, dy)`; `y` grows downward.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Heading::Up => (0, -1),
            Heading::Right => (1, 0),
            Heading::Down => (0, 1),
            Heading::Left => (-1, 0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Heading::Up => "north",
            Heading::Right => "east",
            Heading::Down => "south",
            Heading::Left => "west",
        }
    }
}

/// Atomic action of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    TurnLeft,
    TurnRight,
    MoveForward,
}

impl Action {
    pub fn letter(self) -> char {
        match self {
            Action::TurnLeft => 'L',
            Action::TurnRight => 'R',
            Action::MoveForward => 'F',
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::TurnLeft => "turn left",
            Action::TurnRight => "turn right",
            Action::MoveForward => "move forward",
        };
        f.write_str(name)
    }
}
