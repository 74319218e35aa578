//! Box stacks - the unit the robots consolidate.
//!
//! A stack always holds between [`MIN_STACK_SIZE`] and [`MAX_STACK_SIZE`]
//! units. A stack is owned by exactly one place at a time: a grid cell or a
//! robot's carried slot. Moving it is a move of the value, never an alias.

use crate::types::Position;
use serde::{Deserialize, Serialize};

/// Smallest legal stack.
pub const MIN_STACK_SIZE: u8 = 1;

/// A stack that reaches this size is complete.
pub const MAX_STACK_SIZE: u8 = 5;

/// A stack of unit boxes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackBox {
    /// Where the stack was created. Kept while a robot carries it.
    pub position: Position,
    size: u8,
    pivot: bool,
}

impl StackBox {
    /// Create a stack, clamping `size` into `[1, 5]`.
    pub fn new(position: Position, size: i32) -> Self {
        let size = size.clamp(MIN_STACK_SIZE as i32, MAX_STACK_SIZE as i32) as u8;
        Self {
            position,
            size,
            pivot: false,
        }
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn is_pivot(&self) -> bool {
        self.pivot
    }

    /// Whether this is a single loose unit (the only kind a robot lifts).
    pub fn is_single(&self) -> bool {
        self.size == MIN_STACK_SIZE
    }

    pub fn is_complete(&self) -> bool {
        self.size >= MAX_STACK_SIZE
    }

    pub fn mark_pivot(&mut self) {
        self.pivot = true;
    }

    pub fn clear_pivot(&mut self) {
        self.pivot = false;
    }

    /// Absorb `other` into this stack, destroying it. Returns the new size,
    /// `min(a + b, 5)`.
    pub fn merge(&mut self, other: StackBox) -> u8 {
        self.size = (self.size + other.size).min(MAX_STACK_SIZE);
        self.size
    }
}
