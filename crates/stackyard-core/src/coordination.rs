//! Coordination state - what every robot agrees on.
//!
//! One instance per simulation, constructed by the driver and shared by
//! reference (`Arc`) with every robot. It holds the pivot reference, the
//! global movement counter and the simulation clock. Every accessor takes a
//! single lock, so each call is atomic with respect to the others even if
//! robots are later driven from separate threads.

use crate::presence::RobotHandle;
use crate::stack::MAX_STACK_SIZE;
use crate::types::{Position, RobotState};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Inner {
    /// Cell of the current pivot box. A key into the grid, not a reference.
    pivot: Option<Position>,
    movements: u64,
    started_at: Instant,
}

/// Shared pivot reference, movement counter and clock.
#[derive(Debug)]
pub struct CoordinationState {
    inner: Mutex<Inner>,
}

impl CoordinationState {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                pivot: None,
                movements: 0,
                started_at: Instant::now(),
            }),
        }
    }

    // --- Pivot ---

    pub fn pivot_exists(&self) -> bool {
        self.inner.lock().pivot.is_some()
    }

    pub fn pivot(&self) -> Option<Position> {
        self.inner.lock().pivot
    }

    pub fn set_pivot(&self, at: Position) {
        self.inner.lock().pivot = Some(at);
    }

    pub fn clear_pivot(&self) {
        self.inner.lock().pivot = None;
    }

    /// Clear the pivot only if it is the box at `at`. Returns whether it was.
    pub fn clear_pivot_if(&self, at: Position) -> bool {
        let mut inner = self.inner.lock();
        if inner.pivot == Some(at) {
            inner.pivot = None;
            true
        } else {
            false
        }
    }

    /// Number of robots currently carrying a box to the pivot. Zero when no
    /// pivot exists.
    pub fn count_heading_to_pivot(&self, robots: &[RobotHandle]) -> usize {
        if !self.pivot_exists() {
            return 0;
        }
        robots
            .iter()
            .filter(|r| r.state() == RobotState::MovingToPivot)
            .count()
    }

    /// Whether one more box may be sent towards a pivot of `pivot_size`
    /// while `heading` boxes are already on their way.
    pub fn has_room(heading: usize, pivot_size: u8) -> bool {
        heading + (pivot_size as usize) < MAX_STACK_SIZE as usize
    }

    // --- Clock ---

    /// Record the simulation start and reset the movement counter.
    pub fn start_timer(&self) {
        let mut inner = self.inner.lock();
        inner.started_at = Instant::now();
        inner.movements = 0;
    }

    pub fn elapsed(&self) -> Duration {
        self.inner.lock().started_at.elapsed()
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed().as_millis()
    }

    // --- Movement counter ---

    pub fn reset_movement_count(&self) {
        self.inner.lock().movements = 0;
    }

    pub fn add_movements(&self, count: u64) {
        self.inner.lock().movements += count;
    }

    pub fn movement_count(&self) -> u64 {
        self.inner.lock().movements
    }
}

impl Default for CoordinationState {
    fn default() -> Self {
        Self::new()
    }
}
