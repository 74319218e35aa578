//! Presence - the published face of a robot.
//!
//! A robot's controller owns its private state (path cache, carried box).
//! What peers and observers may see is copied into a [`RobotView`] behind a
//! shared [`RobotHandle`]: negotiation responders read claims from it, the
//! coordination layer counts robots heading to the pivot with it, and the
//! presentation layer draws positions from it.

use crate::types::{Position, RobotState};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A serializable snapshot of a robot's observable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotView {
    pub name: String,
    pub position: Position,
    pub state: RobotState,
    /// Box the robot intends to fetch. A claim hint, not a lock.
    pub target: Option<Position>,
    pub carrying: bool,
    /// Origin cell of the carried box, if any.
    pub carried_from: Option<Position>,
    pub steps: u64,
    pub pickups: u64,
    pub stacks: u64,
    pub designations: u64,
}

impl RobotView {
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            position,
            state: RobotState::default(),
            target: None,
            carrying: false,
            carried_from: None,
            steps: 0,
            pickups: 0,
            stacks: 0,
            designations: 0,
        }
    }

    /// Whether this robot considers the box at `at` taken: it carries it or
    /// has it as its current target.
    pub fn claims(&self, at: Position) -> bool {
        (self.carrying && self.carried_from == Some(at)) || self.target == Some(at)
    }

    /// Idle with nothing adopted - the per-robot termination condition.
    pub fn is_settled(&self) -> bool {
        self.state.is_idle() && self.target.is_none()
    }
}

/// Shared, lock-guarded handle to a robot's [`RobotView`].
#[derive(Debug, Clone)]
pub struct RobotHandle {
    inner: Arc<RwLock<RobotView>>,
}

impl RobotHandle {
    pub fn new(view: RobotView) -> Self {
        Self {
            inner: Arc::new(RwLock::new(view)),
        }
    }

    /// Copy of the current view.
    pub fn view(&self) -> RobotView {
        self.inner.read().clone()
    }

    /// Read a projection without cloning the whole view.
    pub fn read<R>(&self, f: impl FnOnce(&RobotView) -> R) -> R {
        f(&self.inner.read())
    }

    /// Mutate the published view.
    pub fn update(&self, f: impl FnOnce(&mut RobotView)) {
        f(&mut self.inner.write());
    }

    pub fn name(&self) -> String {
        self.read(|v| v.name.clone())
    }

    pub fn state(&self) -> RobotState {
        self.read(|v| v.state)
    }

    pub fn target(&self) -> Option<Position> {
        self.read(|v| v.target)
    }

    /// Whether two handles publish the same robot.
    pub fn same_robot(&self, other: &RobotHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_cover_target_and_carried_box() {
        let mut view = RobotView::new("r", Position::new(0, 0));
        let a = Position::new(1, 1);
        let b = Position::new(2, 2);
        assert!(!view.claims(a));

        view.target = Some(a);
        assert!(view.claims(a));
        assert!(!view.claims(b));

        view.target = None;
        view.carrying = true;
        view.carried_from = Some(b);
        assert!(view.claims(b));
    }

    #[test]
    fn carried_origin_without_carrying_is_not_a_claim() {
        let mut view = RobotView::new("r", Position::new(0, 0));
        view.carried_from = Some(Position::new(3, 3));
        assert!(!view.claims(Position::new(3, 3)));
    }

    #[test]
    fn handle_updates_are_shared() {
        let handle = RobotHandle::new(RobotView::new("r", Position::new(0, 0)));
        let clone = handle.clone();
        clone.update(|v| v.state = RobotState::Exploring);
        assert_eq!(handle.state(), RobotState::Exploring);
        assert!(handle.same_robot(&clone));
        assert!(handle.view().is_settled());
    }
}
