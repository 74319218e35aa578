//! Agent registry - resolves agent names to mailboxes.
//!
//! Built once by the simulation driver and handed to every agent as an
//! `Arc`. Each agent registers exactly once, with a bounded mailbox and the
//! handle of its published view. Delivery never blocks: a full or closed
//! mailbox is reported to the sender, which carries on.

use crate::acl::AclMessage;
use parking_lot::RwLock;
use stackyard_core::error::{Result, StackyardError};
use stackyard_core::presence::RobotHandle;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Sending half of an agent's mailbox.
pub type Mailbox = mpsc::Sender<AclMessage>;

#[derive(Debug)]
struct Entry {
    name: String,
    mailbox: Mailbox,
    handle: RobotHandle,
}

/// Name → mailbox lookup, in registration order.
#[derive(Debug, Default)]
pub struct AgentRegistry {
    agents: RwLock<Vec<Entry>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent under `name`. Names are unique.
    pub fn register(&self, name: impl Into<String>, mailbox: Mailbox, handle: RobotHandle) -> Result<()> {
        let name = name.into();
        let mut agents = self.agents.write();
        if agents.iter().any(|e| e.name == name) {
            return Err(StackyardError::DuplicateAgent(name));
        }
        tracing::debug!(agent = %name, "agent registered");
        agents.push(Entry {
            name,
            mailbox,
            handle,
        });
        Ok(())
    }

    /// Remove an agent. Its mailbox closes once every sender is gone.
    pub fn deregister(&self, name: &str) -> bool {
        let mut agents = self.agents.write();
        let before = agents.len();
        agents.retain(|e| e.name != name);
        agents.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.agents.read().iter().any(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.agents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.read().is_empty()
    }

    /// All registered names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.agents.read().iter().map(|e| e.name.clone()).collect()
    }

    /// Every registered agent except `name`.
    pub fn peers_of(&self, name: &str) -> Vec<String> {
        self.agents
            .read()
            .iter()
            .filter(|e| e.name != name)
            .map(|e| e.name.clone())
            .collect()
    }

    /// The published view handle of an agent.
    pub fn handle(&self, name: &str) -> Option<RobotHandle> {
        self.agents
            .read()
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.handle.clone())
    }

    /// Deliver `msg` to the mailbox of `msg.receiver` without waiting.
    pub fn send(&self, msg: AclMessage) -> Result<()> {
        let mailbox = {
            let agents = self.agents.read();
            agents
                .iter()
                .find(|e| e.name == msg.receiver)
                .map(|e| e.mailbox.clone())
        };
        let Some(mailbox) = mailbox else {
            return Err(StackyardError::unknown_agent(msg.receiver));
        };

        mailbox.try_send(msg).map_err(|e| match e {
            TrySendError::Full(m) => StackyardError::MailboxFull(m.receiver),
            TrySendError::Closed(m) => StackyardError::MailboxClosed(m.receiver),
        })
    }
}
