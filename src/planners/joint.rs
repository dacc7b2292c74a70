//! Exact pickup collection: one uniform-cost search whose state also carries
//! the set of pickups collected so far.
//!
//! The result is a cheapest plan over every reachable pickup, at the price of a
//! state space of `width * height * 4 * 2^k` for `k` pickups.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::infra::{Action, Heading, Position};
use crate::planners::PlanError;
use crate::state::{AgentState, Grid};

/// Upper bound on pickups the bitmask can track.
pub const MAX_JOINT_PICKUPS: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JointRoute {
    pub actions: Vec<Action>,
    pub order: Vec<Position>,
    pub skipped: Vec<Position>,
    pub end: AgentState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct JointState {
    agent: AgentState,
    collected: u32,
}

#[derive(Clone, Eq, PartialEq)]
struct Node {
    state: JointState,
    cost: u32,
    seq: u64,
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
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

pub struct JointSearch<'g> {
    grid: &'g Grid,
}

impl<'g> JointSearch<'g> {
    pub fn new(grid: &'g Grid) -> Self {
        Self { grid }
    }

    /// Pickups the agent can reach without entering the goal, in input order.
    pub fn reachable_pickups(
        &self,
        start: Position,
        goal: Position,
        pickups: &[Position],
    ) -> (Vec<Position>, Vec<Position>) {
        let reachable = self.grid.reachable_from(start, Some(goal));
        let mut kept = Vec::new();
        let mut skipped = Vec::new();
        for &pickup in pickups {
            if kept.contains(&pickup) || skipped.contains(&pickup) {
                continue;
            }
            if reachable.contains(&pickup) {
                kept.push(pickup);
            } else {
                skipped.push(pickup);
            }
        }
        (kept, skipped)
    }

    /// Cheapest route that stands on every reachable pickup and then enters
    /// `goal`. `None` when the goal cannot be reached once they are collected.
    #[tracing::instrument(level = "debug", skip(self, pickups), fields(pickups = pickups.len()))]
    pub fn search(
        &self,
        start: AgentState,
        pickups: &[Position],
        goal: Position,
    ) -> Result<Option<JointRoute>, PlanError> {
        let (targets, skipped) = self.reachable_pickups(start.position, goal, pickups);
        for pickup in &skipped {
            tracing::debug!("{}", PlanError::UnreachablePickup(*pickup));
        }
        if targets.len() > MAX_JOINT_PICKUPS {
            return Err(PlanError::TooManyPickups {
                count: targets.len(),
                limit: MAX_JOINT_PICKUPS,
            });
        }

        let index: HashMap<Position, usize> =
            targets.iter().enumerate().map(|(i, &p)| (p, i)).collect();
        let full: u32 = if targets.len() == MAX_JOINT_PICKUPS {
            u32::MAX
        } else {
            (1u32 << targets.len()) - 1
        };
        let mark = |collected: u32, pos: &Position| match index.get(pos) {
            Some(&i) => collected | (1 << i),
            None => collected,
        };

        let start_state = JointState {
            agent: start,
            collected: mark(0, &start.position),
        };

        let mut open_set = BinaryHeap::new();
        let mut came_from: HashMap<JointState, JointState> = HashMap::new();
        let mut best_cost: HashMap<JointState, u32> = HashMap::new();
        let mut settled: HashSet<JointState> = HashSet::new();
        let mut seq = 0u64;

        best_cost.insert(start_state, 0);
        open_set.push(Node {
            state: start_state,
            cost: 0,
            seq,
        });

        while let Some(Node { state: current, cost, .. }) = open_set.pop() {
            if !settled.insert(current) {
                continue;
            }

            if current.agent.position == goal && current.collected == full {
                tracing::debug!(cost, settled = settled.len(), "Joint route found");
                let chain = reconstruct_chain(&came_from, start_state, current);
                return Ok(Some(route_from_chain(&chain, current.agent, &targets, skipped)));
            }

            for heading in Heading::ALL {
                let next_pos = current.agent.position.step(heading);
                if !self.grid.is_walkable(&next_pos) {
                    continue;
                }
                // The goal only opens once everything is collected.
                if next_pos == goal && current.collected != full {
                    continue;
                }

                let next = JointState {
                    agent: AgentState::new(next_pos, heading),
                    collected: mark(current.collected, &next_pos),
                };
                if settled.contains(&next) {
                    continue;
                }

                let tentative = cost + current.agent.heading.rotation_distance(heading) + 1;
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

        tracing::debug!(settled = settled.len(), "No joint route to {}", goal);
        Ok(None)
    }
}

fn reconstruct_chain(
    came_from: &HashMap<JointState, JointState>,
    start: JointState,
    end: JointState,
) -> Vec<JointState> {
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
    chain
}

fn route_from_chain(
    chain: &[JointState],
    end: AgentState,
    targets: &[Position],
    skipped: Vec<Position>,
) -> JointRoute {
    let mut actions = Vec::new();
    let mut order = Vec::new();

    let newly_collected = |before: u32, after: u32, order: &mut Vec<Position>| {
        let gained = after & !before;
        for (i, &pickup) in targets.iter().enumerate() {
            if gained & (1 << i) != 0 {
                order.push(pickup);
            }
        }
    };

    if let Some(first) = chain.first() {
        newly_collected(0, first.collected, &mut order);
    }
    for pair in chain.windows(2) {
        actions.extend(pair[0].agent.heading.turns_to(pair[1].agent.heading));
        actions.push(Action::MoveForward);
        newly_collected(pair[0].collected, pair[1].collected, &mut order);
    }

    JointRoute {
        actions,
        order,
        skipped,
        end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Level;

    #[test]
    fn test_collects_every_pickup_before_goal() {
        let level = Level::parse(
            "S...C\n\
             .#.#.\n\
             C...G\n",
        )
        .unwrap();
        let goal = level.goal().unwrap();
        let search = JointSearch::new(&level.grid);

        let route = search.search(level.start, &level.pickups(), goal).unwrap().unwrap();

        let mut agent = level.start;
        let mut seen = Vec::new();
        for action in &route.actions {
            agent = agent.apply(*action);
            assert!(level.grid.is_walkable(&agent.position));
            if level.pickups().contains(&agent.position) && !seen.contains(&agent.position) {
                seen.push(agent.position);
            }
            if agent.position == goal {
                assert_eq!(seen.len(), 2, "entered goal before collecting everything");
            }
        }
        assert_eq!(agent.position, goal);
        assert_eq!(route.order, seen);
        assert_eq!(route.end, agent);
    }

    #[test]
    fn test_unreachable_pickups_are_dropped() {
        let level = Level::parse(
            "S.#C\n\
             ..##\n\
             ...G\n",
        )
        .unwrap();
        let goal = level.goal().unwrap();
        let search = JointSearch::new(&level.grid);

        let route = search.search(level.start, &level.pickups(), goal).unwrap().unwrap();
        assert_eq!(route.skipped, vec![Position::new(3, 0)]);
        assert!(route.order.is_empty());
    }

    #[test]
    fn test_walled_goal_has_no_route() {
        let level = Level::parse(
            "S..#G\n\
             ...##\n",
        )
        .unwrap();
        let search = JointSearch::new(&level.grid);
        let route = search.search(level.start, &[], level.goal().unwrap()).unwrap();
        assert!(route.is_none());
    }

    #[test]
    fn test_start_on_goal_without_pickups_is_empty() {
        let grid = Grid::new(3, 3);
        let here = Position::new(1, 1);
        let search = JointSearch::new(&grid);
        let route = search
            .search(AgentState::new(here, Heading::Left), &[], here)
            .unwrap()
            .unwrap();
        assert!(route.actions.is_empty());
    }
}
