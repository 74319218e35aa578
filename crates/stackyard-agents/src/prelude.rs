//! Stackyard Agents Prelude - convenient imports for common usage.
//!
//! ```rust
//! use stackyard_agents::prelude::*;
//! ```

// Re-export protocol types
pub use crate::acl::{AclMessage, Availability, ConversationId, Performative, Request};
pub use crate::registry::AgentRegistry;
pub use crate::negotiation::{ConversationBook, Endpoint, Negotiator, NegotiatorSettings};

// Re-export robot types
pub use crate::robot::{Robot, RobotEvent};

// Re-export from core
pub use stackyard_core::prelude::*;
