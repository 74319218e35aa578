//! # Stackyard Agents
//!
//! Box-stacking robots and the message protocol they negotiate with.
//!
//! - **acl** - addressed, typed messages (`REQUEST` / `INFORM`) with
//!   conversation ids and the availability-query content codec
//! - **registry** - name → mailbox lookup, constructed by the driver and
//!   shared with every agent
//! - **negotiation** - per-agent conversation book, mailbox responder task
//!   and the bounded availability query
//! - **robot** - the task state machine: target selection, routing,
//!   pickup, pivot designation and stacking

pub mod acl;
pub mod registry;
pub mod negotiation;
pub mod robot;
pub mod prelude;
