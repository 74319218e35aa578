//! Robot - the per-agent task state machine.
//!
//! ```text
//!                 no eligible box
//!  MOVING_TO_BOX ────────────────▶ EXPLORING
//!     │     ▲                          ▲
//!  pick up  │ stacked                  │ pivot gone
//!     ▼     │                          │
//!  MOVING_TO_PIVOT ────────────────────┘
//! ```
//!
//! Every tick the robot does at most one thing: adopt a target, take one
//! grid step, designate a pivot, pick a box up, or stack it. Dropping a
//! vanished target is bookkeeping and may precede adopting a new one. Targets, the
//! pivot and the carried box's origin are cell keys; the carried box itself
//! is owned by the robot between pickup and stacking.

use crate::negotiation::{Negotiator, NegotiatorSettings};
use crate::registry::AgentRegistry;
use serde::{Deserialize, Serialize};
use stackyard_core::coordination::CoordinationState;
use stackyard_core::error::Result;
use stackyard_core::grid::Grid;
use stackyard_core::pathfinder::compute_shortest_path;
use stackyard_core::presence::{RobotHandle, RobotView};
use stackyard_core::stack::{StackBox, MAX_STACK_SIZE};
use stackyard_core::types::{Position, RobotState};
use std::collections::VecDeque;
use std::sync::Arc;

/// Something a robot did during one update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RobotEvent {
    Stepped { from: Position, to: Position },
    TargetAdopted { at: Position },
    /// The target no longer holds an eligible box.
    TargetDropped { at: Position },
    WentIdle,
    PivotDesignated { at: Position },
    PickedUp { at: Position },
    /// Pickup declined: the pivot would overflow.
    PickupDeferred {
        at: Position,
        heading: usize,
        pivot_size: u8,
    },
    Stacked { onto: Position, size: u8 },
    /// A stack reached the maximum and the pivot slot was freed.
    PivotCompleted { at: Position },
    NoPath { target: Position },
    /// Carrying a box but no pivot exists any more.
    PivotLost,
}

/// A warehouse robot.
#[derive(Debug)]
pub struct Robot {
    name: String,
    position: Position,
    state: RobotState,
    carried: Option<StackBox>,
    target: Option<Position>,
    cached_path: VecDeque<Position>,
    cached_target: Option<Position>,
    steps: u64,
    pickups: u64,
    stacks: u64,
    designations: u64,
    handle: RobotHandle,
    negotiator: Negotiator,
    coordination: Arc<CoordinationState>,
}

impl Robot {
    /// Create a robot at `position` and join it to the registry.
    ///
    /// Fails with `StackyardError::NoRuntime` outside a Tokio runtime.
    pub fn spawn(
        name: impl Into<String>,
        position: Position,
        registry: Arc<AgentRegistry>,
        coordination: Arc<CoordinationState>,
        settings: NegotiatorSettings,
    ) -> Result<Self> {
        let name = name.into();
        let handle = RobotHandle::new(RobotView::new(name.clone(), position));
        let negotiator = Negotiator::join(name.clone(), handle.clone(), registry, settings)?;

        let robot = Self {
            name,
            position,
            state: RobotState::MovingToBox,
            carried: None,
            target: None,
            cached_path: VecDeque::new(),
            cached_target: None,
            steps: 0,
            pickups: 0,
            stacks: 0,
            designations: 0,
            handle,
            negotiator,
            coordination,
        };
        robot.publish();
        Ok(robot)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn state(&self) -> RobotState {
        self.state
    }

    pub fn target(&self) -> Option<Position> {
        self.target
    }

    pub fn is_carrying(&self) -> bool {
        self.carried.is_some()
    }

    pub fn carried(&self) -> Option<&StackBox> {
        self.carried.as_ref()
    }

    /// Shared handle to the published view.
    pub fn handle(&self) -> RobotHandle {
        self.handle.clone()
    }

    pub fn view(&self) -> RobotView {
        self.handle.view()
    }

    /// Idle with no adopted target.
    pub fn is_settled(&self) -> bool {
        self.state.is_idle() && self.target.is_none()
    }

    /// Advance the state machine by one tick.
    pub async fn update(&mut self, grid: &mut Grid) -> Vec<RobotEvent> {
        let mut events = Vec::new();
        match self.state {
            RobotState::MovingToBox => self.seek_box(grid, &mut events).await,
            RobotState::MovingToPivot => self.deliver(grid, &mut events),
            RobotState::Exploring | RobotState::Stacking => {}
        }
        self.publish();
        events
    }

    async fn seek_box(&mut self, grid: &mut Grid, events: &mut Vec<RobotEvent>) {
        if let Some(at) = self.target {
            if !is_candidate(grid, at) {
                tracing::debug!(robot = %self.name, target = %at, "target gone");
                self.target = None;
                events.push(RobotEvent::TargetDropped { at });
            }
        }

        if self.target.is_none() {
            match self.find_nearest_box(grid).await {
                Some(at) => {
                    tracing::debug!(robot = %self.name, target = %at, "target adopted");
                    self.target = Some(at);
                    events.push(RobotEvent::TargetAdopted { at });
                    // Movement starts on the next tick.
                    return;
                }
                None => {
                    tracing::info!(robot = %self.name, "no box left to pursue, exploring");
                    self.state = RobotState::Exploring;
                    events.push(RobotEvent::WentIdle);
                    return;
                }
            }
        }

        let Some(target) = self.target else {
            return;
        };
        if self.go_to(grid, target, events) {
            self.try_pickup(grid, events);
        }
    }

    fn deliver(&mut self, grid: &mut Grid, events: &mut Vec<RobotEvent>) {
        let Some(pivot) = self.coordination.pivot() else {
            tracing::info!(robot = %self.name, "pivot gone while carrying, exploring");
            self.state = RobotState::Exploring;
            events.push(RobotEvent::PivotLost);
            return;
        };
        if self.go_to(grid, pivot, events) {
            self.try_stack(grid, pivot, events);
        }
    }

    /// Nearest unclaimed box a peer confirms as available.
    async fn find_nearest_box(&self, grid: &Grid) -> Option<Position> {
        let mut candidates: Vec<Position> = grid
            .boxes()
            .filter(|b| !b.is_complete() && !b.is_pivot())
            .map(|b| b.position)
            .collect();
        candidates.sort_by_key(|at| self.position.manhattan(at));

        for at in candidates {
            let claimed = grid
                .robots()
                .iter()
                .filter(|r| !r.same_robot(&self.handle))
                .any(|r| r.target() == Some(at));
            if claimed {
                continue;
            }
            if self.negotiator.query_availability(at).await {
                return Some(at);
            }
            tracing::debug!(robot = %self.name, box_at = %at, "no answer, skipping box");
        }
        None
    }

    /// Move one step towards `target`. Returns `true` when already adjacent
    /// to or on the target, in which case no step is taken.
    fn go_to(&mut self, grid: &Grid, target: Position, events: &mut Vec<RobotEvent>) -> bool {
        if self.position.is_adjacent_or_on(&target) {
            return true;
        }

        let stale = self.cached_target != Some(target)
            || self
                .cached_path
                .front()
                .map_or(true, |&next| !grid.is_traversable(next, target));
        if stale {
            self.cached_path = compute_shortest_path(grid, self.position, target).into();
            self.cached_target = Some(target);
            tracing::debug!(robot = %self.name, %target, steps = self.cached_path.len(), "path computed");
        }

        let Some(next) = self.cached_path.pop_front() else {
            tracing::warn!(robot = %self.name, %target, "no path to target");
            events.push(RobotEvent::NoPath { target });
            return false;
        };

        let from = self.position;
        self.position = next;
        self.steps += 1;
        self.coordination.add_movements(1);
        events.push(RobotEvent::Stepped { from, to: next });
        false
    }

    fn try_pickup(&mut self, grid: &mut Grid, events: &mut Vec<RobotEvent>) {
        if self.carried.is_some() {
            return;
        }
        let Some(at) = self
            .position
            .neighbors()
            .into_iter()
            .find(|&n| grid.box_at(n).is_some_and(|b| b.is_single() && !b.is_pivot()))
        else {
            return;
        };

        let Some(pivot) = self.coordination.pivot() else {
            if let Some(stack) = grid.box_at_mut(at) {
                stack.mark_pivot();
            }
            self.coordination.set_pivot(at);
            self.target = None;
            self.designations += 1;
            self.coordination.add_movements(1);
            tracing::info!(robot = %self.name, pivot = %at, "pivot designated");
            events.push(RobotEvent::PivotDesignated { at });
            return;
        };

        let Some(pivot_size) = grid.box_at(pivot).map(StackBox::size) else {
            tracing::warn!(robot = %self.name, %pivot, "pivot reference points at an empty cell");
            self.coordination.clear_pivot_if(pivot);
            return;
        };
        let heading = self.coordination.count_heading_to_pivot(grid.robots());
        if !CoordinationState::has_room(heading, pivot_size) {
            tracing::debug!(robot = %self.name, box_at = %at, heading, pivot_size, "pickup deferred");
            events.push(RobotEvent::PickupDeferred {
                at,
                heading,
                pivot_size,
            });
            return;
        }

        let Some(stack) = grid.take_box(at) else {
            return;
        };
        self.carried = Some(stack);
        self.target = None;
        self.state = RobotState::MovingToPivot;
        self.pickups += 1;
        self.coordination.add_movements(1);
        tracing::info!(robot = %self.name, box_at = %at, "box picked up");
        events.push(RobotEvent::PickedUp { at });
    }

    fn try_stack(&mut self, grid: &mut Grid, pivot: Position, events: &mut Vec<RobotEvent>) {
        let Some(carried) = self.carried.take() else {
            self.state = RobotState::MovingToBox;
            return;
        };

        let onto = if grid.has_box(pivot.x, pivot.y) {
            Some(pivot)
        } else {
            self.position
                .neighbors()
                .into_iter()
                .find(|&n| grid.box_at(n).is_some())
        };
        let Some(onto) = onto else {
            self.carried = Some(carried);
            return;
        };

        let size = match grid.merge_into(onto, carried) {
            Ok(size) => size,
            Err(back) => {
                self.carried = Some(back);
                return;
            }
        };
        self.stacks += 1;
        self.coordination.add_movements(1);
        tracing::info!(robot = %self.name, %onto, size, "box stacked");
        events.push(RobotEvent::Stacked { onto, size });

        if size >= MAX_STACK_SIZE {
            if let Some(stack) = grid.box_at_mut(onto) {
                stack.clear_pivot();
            }
            if self.coordination.clear_pivot_if(onto) {
                tracing::info!(robot = %self.name, pivot = %onto, "pivot complete");
                events.push(RobotEvent::PivotCompleted { at: onto });
            }
        }

        self.state = RobotState::MovingToBox;
        self.target = None;
    }

    fn publish(&self) {
        let carried_from = self.carried.as_ref().map(|b| b.position);
        self.handle.update(|v| {
            v.position = self.position;
            v.state = self.state;
            v.target = self.target;
            v.carrying = carried_from.is_some();
            v.carried_from = carried_from;
            v.steps = self.steps;
            v.pickups = self.pickups;
            v.stacks = self.stacks;
            v.designations = self.designations;
        });
    }
}

/// A box a robot may pursue: present, below the maximum, not the pivot.
fn is_candidate(grid: &Grid, at: Position) -> bool {
    grid.box_at(at)
        .is_some_and(|b| !b.is_complete() && !b.is_pivot())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn robot(
        name: &str,
        at: Position,
        registry: &Arc<AgentRegistry>,
        coordination: &Arc<CoordinationState>,
    ) -> Robot {
        Robot::spawn(
            name,
            at,
            Arc::clone(registry),
            Arc::clone(coordination),
            NegotiatorSettings::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn adjacent_target_needs_no_path() {
        let registry = Arc::new(AgentRegistry::new());
        let coordination = Arc::new(CoordinationState::new());
        let mut grid = Grid::new(5, 5);
        grid.place_box(1, 0, 1).unwrap();

        let mut r1 = robot("r1", Position::new(0, 0), &registry, &coordination);
        let r2 = robot("r2", Position::new(4, 4), &registry, &coordination);
        grid.add_robot(r1.handle());
        grid.add_robot(r2.handle());

        assert_eq!(
            r1.update(&mut grid).await,
            vec![RobotEvent::TargetAdopted { at: Position::new(1, 0) }]
        );
        assert_eq!(coordination.movement_count(), 0);
        assert_eq!(
            r1.update(&mut grid).await,
            vec![RobotEvent::PivotDesignated { at: Position::new(1, 0) }]
        );
        assert_eq!(coordination.pivot(), Some(Position::new(1, 0)));
        assert_eq!(coordination.movement_count(), 1);
        assert_eq!(r1.position(), Position::new(0, 0));
        assert_eq!(r1.target(), None);
        assert_eq!(r1.view().designations, 1);
    }

    #[tokio::test]
    async fn adopting_a_target_takes_the_whole_tick() {
        let registry = Arc::new(AgentRegistry::new());
        let coordination = Arc::new(CoordinationState::new());
        let mut grid = Grid::new(5, 5);
        grid.place_box(4, 0, 1).unwrap();

        let mut r1 = robot("r1", Position::new(0, 0), &registry, &coordination);
        let r2 = robot("r2", Position::new(4, 4), &registry, &coordination);
        grid.add_robot(r1.handle());
        grid.add_robot(r2.handle());

        assert_eq!(
            r1.update(&mut grid).await,
            vec![RobotEvent::TargetAdopted { at: Position::new(4, 0) }]
        );
        assert_eq!(r1.position(), Position::new(0, 0));
        assert_eq!(coordination.movement_count(), 0);
        assert_eq!(r1.view().target, Some(Position::new(4, 0)));

        assert_eq!(
            r1.update(&mut grid).await,
            vec![RobotEvent::Stepped {
                from: Position::new(0, 0),
                to: Position::new(1, 0),
            }]
        );
        assert_eq!(coordination.movement_count(), 1);
    }

    #[tokio::test]
    async fn exploring_robot_stays_put() {
        let registry = Arc::new(AgentRegistry::new());
        let coordination = Arc::new(CoordinationState::new());
        let mut grid = Grid::new(3, 3);
        let mut r1 = robot("r1", Position::new(0, 0), &registry, &coordination);
        grid.add_robot(r1.handle());

        assert_eq!(r1.update(&mut grid).await, vec![RobotEvent::WentIdle]);
        assert!(r1.is_settled());
        assert!(r1.update(&mut grid).await.is_empty());
        assert_eq!(r1.view().state, RobotState::Exploring);
    }
}
