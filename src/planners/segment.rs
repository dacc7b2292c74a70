//! Turn-aware uniform-cost search between two cells.
//!
//! Every expansion tries the four headings: turning costs one per quarter turn
//! and is always followed by a single forward step costing one. Frontier ties
//! are broken by insertion order so equal inputs always yield the same path.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::infra::{Action, Heading, Position};
use crate::state::{AgentState, Grid};

/// Actions from one search together with where they leave the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub actions: Vec<Action>,
    pub end: AgentState,
}

impl Segment {
    /// Zero-length segment for an agent already standing on its target.
    pub fn empty(at: AgentState) -> Self {
        Self {
            actions: Vec::new(),
            end: at,
        }
    }

    /// Every action costs one, so the cost is the action count.
    pub fn cost(&self) -> usize {
        self.actions.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SearchState {
    pos: Position,
    heading: Heading,
}

#[derive(Clone, Eq, PartialEq)]
struct Node {
    state: SearchState,
    cost: u32,
    seq: u64,
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on cost, then on insertion order.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub struct SegmentSearch<'g> {
    grid: &'g Grid,
    goal: Option<Position>,
}

impl<'g> SegmentSearch<'g> {
    /// `goal` is the designated goal cell; entering it is gated per search.
    pub fn new(grid: &'g Grid, goal: Option<Position>) -> Self {
        Self { grid, goal }
    }

    pub fn can_enter(&self, pos: &Position, goal_entry_allowed: bool) -> bool {
        self.grid.is_walkable(pos) && (goal_entry_allowed || self.goal != Some(*pos))
    }

    /// Cheapest action list from the start state to `target`, or an empty list
    /// when the agent is already there or the target cannot be reached.
    pub fn search(
        &self,
        start_position: Position,
        start_heading: Heading,
        target: Position,
        goal_entry_allowed: bool,
    ) -> Vec<Action> {
        self.find(
            AgentState::new(start_position, start_heading),
            target,
            goal_entry_allowed,
        )
        .map(|segment| segment.actions)
        .unwrap_or_default()
    }

    /// Like [`search`](Self::search), but tells "already there" (`Some` with no
    /// actions) apart from "unreachable" (`None`).
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn find(
        &self,
        start: AgentState,
        target: Position,
        goal_entry_allowed: bool,
    ) -> Option<Segment> {
        if start.position == target {
            return Some(Segment::empty(start));
        }
        if !self.can_enter(&target, goal_entry_allowed) {
            return None;
        }

        let start_state = SearchState {
            pos: start.position,
            heading: start.heading,
        };

        let mut open_set = BinaryHeap::new();
        let mut came_from: HashMap<SearchState, SearchState> = HashMap::new();
        let mut best_cost: HashMap<SearchState, u32> = HashMap::new();
        let mut settled: HashMap<SearchState, u32> = HashMap::new();
        let mut seq = 0u64;

        best_cost.insert(start_state, 0);
        open_set.push(Node {
            state: start_state,
            cost: 0,
            seq,
        });

        while let Some(Node { state: current, cost, .. }) = open_set.pop() {
            if settled.contains_key(&current) {
                continue;
            }
            settled.insert(current, cost);

            if current.pos == target {
                let segment = reconstruct_segment(&came_from, start_state, current);
                tracing::trace!(
                    cost,
                    settled = settled.len(),
                    "Segment {} -> {} found",
                    start.position,
                    target
                );
                return Some(segment);
            }

            for heading in Heading::ALL {
                let next_pos = current.pos.step(heading);
                if !self.can_enter(&next_pos, goal_entry_allowed) {
                    continue;
                }

                let next = SearchState {
                    pos: next_pos,
                    heading,
                };
                if settled.contains_key(&next) {
                    continue;
                }

                let tentative = cost + current.heading.rotation_distance(heading) + 1;
                if tentative < *best_cost.get(&next).unwrap_or(&u32::MAX) {
                    best_cost.insert(next, tentative);
                    came_from.insert(next, current);
                    seq += 1;
                    open_set.push(Node {
                        state: next,
                        cost: tentative,
                        seq,
                    });
                }
            }
        }

        tracing::trace!(
            settled = settled.len(),
            "No segment {} -> {}",
            start.position,
            target
        );
        None
    }
}

fn reconstruct_segment(
    came_from: &HashMap<SearchState, SearchState>,
    start: SearchState,
    end: SearchState,
) -> Segment {
    let mut chain = vec![end];
    let mut current = end;
    while current != start {
        match came_from.get(&current) {
            Some(&prev) => {
                chain.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    chain.reverse();

    let mut actions = Vec::new();
    for pair in chain.windows(2) {
        actions.extend(pair[0].heading.turns_to(pair[1].heading));
        actions.push(Action::MoveForward);
    }

    Segment {
        actions,
        end: AgentState::new(end.pos, end.heading),
    }
}
