use std::str::FromStr;

use thiserror::Error;

use crate::infra::{Action, Heading, Position};
use crate::planners::joint::{JointSearch, MAX_JOINT_PICKUPS};
use crate::planners::segment::SegmentSearch;
use crate::planners::tour::CoinTourPlanner;
use crate::planners::{Plan, PlanError};
use crate::state::{AgentState, Grid, Level};

/// How pickups are ordered before heading for the goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Nearest pickup next. Fast, not always optimal.
    #[default]
    GreedyTour,
    /// Search over every collected-pickup set. Optimal, exponential in pickups.
    ExactJoint,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown strategy {0:?}, expected \"greedy\" or \"exact\"")]
pub struct UnknownStrategy(pub String);

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "greedy" | "greedy-tour" => Ok(Strategy::GreedyTour),
            "exact" | "exact-joint" => Ok(Strategy::ExactJoint),
            other => Err(UnknownStrategy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub strategy: Strategy,
    /// Above this many reachable pickups the exact strategy falls back to greedy.
    pub max_exact_pickups: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::GreedyTour,
            max_exact_pickups: 10,
        }
    }
}

/// Entry point of the planning core: pickups first, then the goal.
pub struct PathPlanner {
    config: PlannerConfig,
}

impl Default for PathPlanner {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}

impl PathPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan for a level's own start, coins and goal.
    pub fn plan_level(&self, level: &Level) -> Result<Plan, PlanError> {
        let goal = level.goal().ok_or(PlanError::MissingGoal)?;
        self.plan(
            &level.grid,
            level.start.position,
            level.start.heading,
            &level.pickups(),
            goal,
        )
    }

    /// Full action sequence from the start state over the pickups to `goal`.
    ///
    /// Unreachable pickups are skipped. If the goal itself cannot be reached the
    /// error carries the partial plan built so far.
    #[tracing::instrument(level = "debug", skip(self, grid, pickups), fields(strategy = ?self.config.strategy, pickups = pickups.len()))]
    pub fn plan(
        &self,
        grid: &Grid,
        start_position: Position,
        start_heading: Heading,
        pickups: &[Position],
        goal: Position,
    ) -> Result<Plan, PlanError> {
        match self.config.strategy {
            Strategy::GreedyTour => {
                self.plan_greedy(grid, start_position, start_heading, pickups, goal)
            }
            Strategy::ExactJoint => {
                self.plan_exact(grid, start_position, start_heading, pickups, goal)
            }
        }
    }

    fn plan_greedy(
        &self,
        grid: &Grid,
        start_position: Position,
        start_heading: Heading,
        pickups: &[Position],
        goal: Position,
    ) -> Result<Plan, PlanError> {
        let search = SegmentSearch::new(grid, Some(goal));
        let tour = CoinTourPlanner::new(grid, Some(goal)).plan_tour(
            start_position,
            start_heading,
            pickups,
        );

        let mut actions: Vec<Action> = tour
            .segments
            .iter()
            .flat_map(|segment| segment.actions.iter().copied())
            .collect();

        let Some(final_segment) = search.find(tour.end, goal, true) else {
            tracing::debug!(
                "Goal {} unreachable from {}, partial plan has {} actions",
                goal,
                tour.final_position(),
                actions.len()
            );
            return Err(PlanError::NoRouteFound {
                goal,
                partial: Plan {
                    actions,
                    order: tour.order,
                    skipped: tour.skipped,
                },
            });
        };
        actions.extend(final_segment.actions);

        let plan = Plan {
            actions,
            order: tour.order,
            skipped: tour.skipped,
        };
        tracing::debug!("Greedy plan: {}", plan);
        Ok(plan)
    }

    fn plan_exact(
        &self,
        grid: &Grid,
        start_position: Position,
        start_heading: Heading,
        pickups: &[Position],
        goal: Position,
    ) -> Result<Plan, PlanError> {
        let joint = JointSearch::new(grid);
        let (targets, _) = joint.reachable_pickups(start_position, goal, pickups);
        let limit = self.config.max_exact_pickups.min(MAX_JOINT_PICKUPS);
        if targets.len() > limit {
            tracing::warn!(
                "{} reachable pickups exceed the exact limit of {}, using greedy tour",
                targets.len(),
                limit
            );
            return self.plan_greedy(grid, start_position, start_heading, pickups, goal);
        }

        let start = AgentState::new(start_position, start_heading);
        match joint.search(start, pickups, goal)? {
            Some(route) => {
                let plan = Plan {
                    actions: route.actions,
                    order: route.order,
                    skipped: route.skipped,
                };
                tracing::debug!("Exact plan: {}", plan);
                Ok(plan)
            }
            // The greedy pass rebuilds the pickup prefix for the error.
            None => self.plan_greedy(grid, start_position, start_heading, pickups, goal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CellType;

    fn scenario_grid() -> Grid {
        Grid::new(5, 5)
    }

    #[test]
    fn test_five_by_five_scenario() {
        let grid = scenario_grid();
        let planner = PathPlanner::default();

        let plan = planner
            .plan(
                &grid,
                Position::new(0, 0),
                Heading::Right,
                &[Position::new(0, 4)],
                Position::new(4, 4),
            )
            .unwrap();

        use Action::*;
        assert_eq!(
            plan.actions,
            vec![
                TurnRight,
                MoveForward,
                MoveForward,
                MoveForward,
                MoveForward,
                TurnLeft,
                MoveForward,
                MoveForward,
                MoveForward,
                MoveForward,
            ]
        );
        assert_eq!(plan.cost(), 10);
        assert_eq!(plan.order, vec![Position::new(0, 4)]);
    }

    #[test]
    fn test_exact_matches_scenario_cost() {
        let grid = scenario_grid();
        let planner = PathPlanner::new(PlannerConfig {
            strategy: Strategy::ExactJoint,
            ..PlannerConfig::default()
        });

        let plan = planner
            .plan(
                &grid,
                Position::new(0, 0),
                Heading::Right,
                &[Position::new(0, 4)],
                Position::new(4, 4),
            )
            .unwrap();
        assert_eq!(plan.cost(), 10);
    }

    #[test]
    fn test_walled_goal_returns_partial_plan() {
        let level = Level::parse(
            "S.C.#G\n\
             ....##\n",
        )
        .unwrap();

        for strategy in [Strategy::GreedyTour, Strategy::ExactJoint] {
            let planner = PathPlanner::new(PlannerConfig {
                strategy,
                ..PlannerConfig::default()
            });
            match planner.plan_level(&level) {
                Err(PlanError::NoRouteFound { goal, partial }) => {
                    assert_eq!(goal, Position::new(5, 0));
                    assert_eq!(partial.actions, vec![Action::MoveForward, Action::MoveForward]);
                    assert_eq!(partial.order, vec![Position::new(2, 0)]);
                }
                other => panic!("expected NoRouteFound, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_plan_replays_over_pickups_to_goal() {
        let mut solved = 0;
        for seed in 0..25 {
            let level = Level::generate(12, seed).unwrap();
            let planner = PathPlanner::default();
            let Ok(plan) = planner.plan_level(&level) else {
                continue;
            };

            let states = plan.trace(&level.grid, level.start).unwrap();
            let goal = level.goal().unwrap();
            let visited: Vec<Position> = states.iter().map(|s| s.position).collect();

            assert_eq!(visited.last(), Some(&goal));
            assert_eq!(visited.iter().filter(|&&p| p == goal).count(), 1);

            let reachable = level.grid.reachable_from(level.start.position, Some(goal));
            for pickup in level.pickups() {
                if reachable.contains(&pickup) {
                    assert!(
                        visited.contains(&pickup),
                        "seed {seed}: reachable pickup {pickup} not visited"
                    );
                    assert!(!plan.skipped.contains(&pickup));
                } else {
                    assert!(
                        plan.skipped.contains(&pickup),
                        "seed {seed}: unreachable pickup {pickup} not reported"
                    );
                }
            }
            solved += 1;
        }
        assert!(solved > 0);
    }

    #[test]
    fn test_plans_are_deterministic() {
        let level = Level::generate(18, 7).unwrap();
        let planner = PathPlanner::default();
        let first = planner.plan_level(&level);
        for _ in 0..5 {
            assert_eq!(planner.plan_level(&level), first);
        }
    }

    #[test]
    fn test_exact_never_costs_more_than_greedy() {
        let greedy = PathPlanner::default();
        let exact = PathPlanner::new(PlannerConfig {
            strategy: Strategy::ExactJoint,
            max_exact_pickups: 8,
        });

        for seed in 0..15 {
            let level = Level::generate(10, seed).unwrap();
            if let (Ok(g), Ok(e)) = (greedy.plan_level(&level), exact.plan_level(&level)) {
                assert!(e.cost() <= g.cost(), "seed {seed}: exact {} > greedy {}", e.cost(), g.cost());
            }
        }
    }

    #[test]
    fn test_exact_beats_greedy_when_nearest_first_misleads() {
        // Nearest-first takes the coin ahead and then has to double back twice;
        // turning around first sweeps both coins on the way to the goal.
        let level = Level::parse("C..S.C.G\n").unwrap();
        let greedy = PathPlanner::default().plan_level(&level).unwrap();
        let exact = PathPlanner::new(PlannerConfig {
            strategy: Strategy::ExactJoint,
            ..PlannerConfig::default()
        })
        .plan_level(&level)
        .unwrap();

        assert!(exact.cost() < greedy.cost());
        assert_eq!(greedy.cost(), 18);
        assert_eq!(exact.cost(), 14);
        assert_eq!(exact.order, vec![Position::new(0, 0), Position::new(5, 0)]);
    }

    #[test]
    fn test_exact_falls_back_above_limit() {
        let mut grid = Grid::new(6, 6);
        let coins: Vec<Position> = (0..6).map(|x| Position::new(x, 2)).collect();
        for &coin in &coins {
            grid.set(coin, CellType::Coin);
        }
        let goal = Position::new(5, 5);
        grid.set(goal, CellType::Goal);

        let limited = PathPlanner::new(PlannerConfig {
            strategy: Strategy::ExactJoint,
            max_exact_pickups: 3,
        });
        let plan = limited
            .plan(&grid, Position::new(0, 0), Heading::Down, &coins, goal)
            .unwrap();
        let greedy = PathPlanner::default()
            .plan(&grid, Position::new(0, 0), Heading::Down, &coins, goal)
            .unwrap();
        assert_eq!(plan, greedy);
    }

    #[test]
    fn test_start_on_goal_without_pickups() {
        let grid = Grid::new(3, 3);
        let here = Position::new(1, 1);
        let plan = PathPlanner::default()
            .plan(&grid, here, Heading::Up, &[], here)
            .unwrap();
        assert!(plan.is_empty());
        assert_eq!(
            plan.trace(&grid, AgentState::new(here, Heading::Up)).unwrap().len(),
            1
        );
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("greedy".parse::<Strategy>(), Ok(Strategy::GreedyTour));
        assert_eq!(" Exact ".parse::<Strategy>(), Ok(Strategy::ExactJoint));
        assert!("random".parse::<Strategy>().is_err());
    }
}
