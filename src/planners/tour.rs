use crate::infra::{Heading, Position};
use crate::planners::PlanError;
use crate::planners::segment::{Segment, SegmentSearch};
use crate::state::{AgentState, Grid};

/// Pickups in visiting order plus the segments that connect them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tour {
    pub segments: Vec<Segment>,
    /// Pickups in the order the agent first stands on them.
    pub order: Vec<Position>,
    /// Pickups with no path from the agent; they were left out.
    pub skipped: Vec<Position>,
    pub end: AgentState,
}

impl Tour {
    pub fn final_position(&self) -> Position {
        self.end.position
    }

    pub fn final_heading(&self) -> Heading {
        self.end.heading
    }

    pub fn cost(&self) -> usize {
        self.segments.iter().map(Segment::cost).sum()
    }
}

/// Greedy nearest-next ordering of pickups.
///
/// Each round searches a path to every pending pickup from the current state
/// and commits to the cheapest one. This is a heuristic: the resulting order is
/// not guaranteed to minimise the total cost.
pub struct CoinTourPlanner<'g> {
    search: SegmentSearch<'g>,
}

impl<'g> CoinTourPlanner<'g> {
    pub fn new(grid: &'g Grid, goal: Option<Position>) -> Self {
        Self {
            search: SegmentSearch::new(grid, goal),
        }
    }

    #[tracing::instrument(level = "debug", skip(self, pending_pickups), fields(pickups = pending_pickups.len()))]
    pub fn plan_tour(
        &self,
        start_position: Position,
        start_heading: Heading,
        pending_pickups: &[Position],
    ) -> Tour {
        let mut current = AgentState::new(start_position, start_heading);

        let mut pending: Vec<Position> = Vec::with_capacity(pending_pickups.len());
        for &pickup in pending_pickups {
            if !pending.contains(&pickup) {
                pending.push(pickup);
            }
        }

        let mut segments = Vec::new();
        let mut order = Vec::new();
        let mut skipped = Vec::new();

        // Standing on a pickup collects it.
        if let Some(index) = pending.iter().position(|&p| p == current.position) {
            order.push(pending.remove(index));
        }

        while !pending.is_empty() {
            let mut best: Option<(Position, Segment)> = None;
            let mut unreachable = Vec::new();

            for &pickup in &pending {
                match self.search.find(current, pickup, false) {
                    // Strict comparison keeps the earliest pickup on equal cost.
                    Some(segment) => {
                        if best.as_ref().is_none_or(|(_, b)| segment.cost() < b.cost()) {
                            best = Some((pickup, segment));
                        }
                    }
                    None => unreachable.push(pickup),
                }
            }

            for pickup in unreachable {
                tracing::debug!("{}", PlanError::UnreachablePickup(pickup));
                pending.retain(|&p| p != pickup);
                skipped.push(pickup);
            }

            let Some((target, segment)) = best else {
                break;
            };

            tracing::debug!(
                "Next pickup {} from {} facing {} ({} actions)",
                target,
                current.position,
                current.heading.name(),
                segment.cost()
            );

            // The chosen segment crosses no other pending pickup: one on the way
            // would have cost strictly less and been chosen instead.
            pending.retain(|&p| p != target);
            order.push(target);

            current = segment.end;
            segments.push(segment);
        }

        Tour {
            segments,
            order,
            skipped,
            end: current,
        }
    }
}
