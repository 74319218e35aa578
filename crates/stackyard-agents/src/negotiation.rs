//! Negotiation - availability queries over agent mailboxes.
//!
//! Every robot joins the [`AgentRegistry`] with a bounded mailbox. A
//! responder task drains that mailbox: it answers availability requests from
//! the robot's published view and records replies to the robot's own
//! conversations. The robot itself only ever awaits its conversation book,
//! so answering a peer never runs on the asking robot's call stack.
//!
//! A query is answered as soon as any peer replies. The reply payload is
//! not inspected: a `NO` counts exactly like a `YES`. Only silence (every
//! peer unreachable or too slow) yields "unavailable".

use crate::acl::{AclMessage, Availability, ConversationId, Performative, Request};
use crate::registry::AgentRegistry;
use parking_lot::Mutex;
use stackyard_core::error::{Result, StackyardError};
use stackyard_core::presence::RobotHandle;
use stackyard_core::types::Position;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;

/// Default bound on an availability query.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(100);

/// Default mailbox capacity per agent.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 32;

/// Per-agent negotiation knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiatorSettings {
    pub mailbox_capacity: usize,
    pub timeout: Duration,
}

impl Default for NegotiatorSettings {
    fn default() -> Self {
        Self {
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Pending {
    answered: bool,
    outstanding: usize,
}

/// Open conversations of one agent.
#[derive(Debug, Default)]
pub struct ConversationBook {
    pending: Mutex<HashMap<ConversationId, Pending>>,
    changed: Notify,
}

impl ConversationBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a conversation expecting `outstanding` replies.
    pub fn open(&self, id: ConversationId, outstanding: usize) {
        self.pending.lock().insert(
            id,
            Pending {
                answered: false,
                outstanding,
            },
        );
    }

    /// Record one reply. Returns `false` for unknown or closed conversations.
    pub fn record_reply(&self, id: &ConversationId) -> bool {
        let known = match self.pending.lock().get_mut(id) {
            Some(p) => {
                p.answered = true;
                p.outstanding = p.outstanding.saturating_sub(1);
                true
            }
            None => false,
        };
        if known {
            self.changed.notify_waiters();
        }
        known
    }

    /// Stop expecting a reply that will never come (the request was not
    /// delivered).
    pub fn forget_one(&self, id: &ConversationId) {
        if let Some(p) = self.pending.lock().get_mut(id) {
            p.outstanding = p.outstanding.saturating_sub(1);
        }
        self.changed.notify_waiters();
    }

    pub fn is_open(&self, id: &ConversationId) -> bool {
        self.pending.lock().contains_key(id)
    }

    pub fn open_count(&self) -> usize {
        self.pending.lock().len()
    }

    fn settled(&self, id: &ConversationId) -> bool {
        self.pending
            .lock()
            .get(id)
            .map_or(true, |p| p.outstanding == 0)
    }

    /// Wait until every expected reply arrived or `timeout` elapsed, then
    /// discard the conversation. Returns whether any reply arrived.
    pub async fn wait(&self, id: &ConversationId, timeout: Duration) -> bool {
        let all_in = async {
            loop {
                let mut notified = std::pin::pin!(self.changed.notified());
                notified.as_mut().enable();
                if self.settled(id) {
                    return;
                }
                notified.await;
            }
        };
        if tokio::time::timeout(timeout, all_in).await.is_err() {
            tracing::debug!(conversation = %id, "negotiation timed out");
        }
        self.close(id)
    }

    /// Discard a conversation, returning whether it was answered.
    pub fn close(&self, id: &ConversationId) -> bool {
        self.pending.lock().remove(id).is_some_and(|p| p.answered)
    }
}

/// The receiving side of an agent: what its responder task runs.
#[derive(Debug, Clone)]
pub struct Endpoint {
    name: String,
    handle: RobotHandle,
    book: Arc<ConversationBook>,
    registry: Arc<AgentRegistry>,
}

impl Endpoint {
    pub fn new(
        name: impl Into<String>,
        handle: RobotHandle,
        book: Arc<ConversationBook>,
        registry: Arc<AgentRegistry>,
    ) -> Self {
        Self {
            name: name.into(),
            handle,
            book,
            registry,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle one incoming message.
    pub fn receive(&self, msg: AclMessage) {
        match msg.performative {
            Performative::Request => self.answer(msg),
            Performative::Inform => {
                if !self.book.record_reply(&msg.conversation_id) {
                    tracing::debug!(agent = %self.name, conversation = %msg.conversation_id, "reply to unknown conversation ignored");
                    return;
                }
                if Availability::parse(&msg.content) == Some(Availability::Unavailable) {
                    tracing::debug!(agent = %self.name, from = %msg.sender, "NO reply counted as answered");
                }
            }
        }
    }

    fn answer(&self, msg: AclMessage) {
        let at = match Request::parse(&msg.content) {
            Ok(Some(Request::Availability(at))) => at,
            Ok(None) => {
                tracing::debug!(agent = %self.name, content = %msg.content, "unknown request ignored");
                return;
            }
            Err(e) => {
                tracing::warn!(agent = %self.name, error = %e, "bad request ignored");
                return;
            }
        };

        let answer = if self.handle.read(|v| v.claims(at)) {
            Availability::Unavailable
        } else {
            Availability::Available
        };
        tracing::debug!(agent = %self.name, to = %msg.sender, box_at = %at, ?answer, "answering availability");

        if let Err(e) = self.registry.send(msg.reply(answer.to_content())) {
            tracing::warn!(agent = %self.name, error = %e, "reply not delivered");
        }
    }
}

/// An agent's membership in the registry plus its responder task.
///
/// Dropping the negotiator deregisters the agent and stops the responder.
#[derive(Debug)]
pub struct Negotiator {
    endpoint: Endpoint,
    settings: NegotiatorSettings,
    responder: JoinHandle<()>,
}

impl Negotiator {
    /// Register `name` and start serving its mailbox.
    ///
    /// Fails with [`StackyardError::NoRuntime`] outside a Tokio runtime.
    pub fn join(
        name: impl Into<String>,
        handle: RobotHandle,
        registry: Arc<AgentRegistry>,
        settings: NegotiatorSettings,
    ) -> Result<Self> {
        let name = name.into();
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| StackyardError::NoRuntime(name.clone()))?;
        let (tx, rx) = mpsc::channel(settings.mailbox_capacity.max(1));
        registry.register(name.clone(), tx, handle.clone())?;

        let endpoint = Endpoint::new(name, handle, Arc::new(ConversationBook::new()), registry);
        let responder = runtime.spawn(serve(endpoint.clone(), rx));

        Ok(Self {
            endpoint,
            settings,
            responder,
        })
    }

    pub fn name(&self) -> &str {
        &self.endpoint.name
    }

    pub fn settings(&self) -> NegotiatorSettings {
        self.settings
    }

    pub fn book(&self) -> &ConversationBook {
        &self.endpoint.book
    }

    /// Ask every other registered agent whether the box at `at` is free.
    ///
    /// Returns within the configured timeout. `true` once any peer replied;
    /// `false` with no peers, no delivered requests, or no replies in time.
    pub async fn query_availability(&self, at: Position) -> bool {
        let Endpoint {
            name,
            book,
            registry,
            ..
        } = &self.endpoint;

        let peers = registry.peers_of(name);
        if peers.is_empty() {
            return false;
        }

        let conversation = ConversationId::generate();
        let content = Request::Availability(at).to_content();
        book.open(conversation.clone(), peers.len());

        let mut delivered = 0usize;
        for peer in peers {
            let msg = AclMessage::request(name.clone(), peer, content.clone(), conversation.clone());
            match registry.send(msg) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(agent = %name, error = %e, "availability request not delivered");
                    book.forget_one(&conversation);
                }
            }
        }
        if delivered == 0 {
            book.close(&conversation);
            return false;
        }

        let answered = book.wait(&conversation, self.settings.timeout).await;
        tracing::debug!(agent = %name, box_at = %at, delivered, answered, "availability query finished");
        answered
    }
}

impl Drop for Negotiator {
    fn drop(&mut self) {
        self.endpoint.registry.deregister(&self.endpoint.name);
        self.responder.abort();
    }
}

async fn serve(endpoint: Endpoint, mut mailbox: mpsc::Receiver<AclMessage>) {
    while let Some(msg) = mailbox.recv().await {
        tracing::trace!(agent = %endpoint.name, %msg, "mail");
        endpoint.receive(msg);
    }
    tracing::debug!(agent = %endpoint.name, "mailbox closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wait_returns_once_every_reply_is_in() {
        let book = Arc::new(ConversationBook::new());
        let id = ConversationId::generate();
        book.open(id.clone(), 2);

        let replier = {
            let book = Arc::clone(&book);
            let id = id.clone();
            tokio::spawn(async move {
                book.record_reply(&id);
                tokio::task::yield_now().await;
                book.record_reply(&id);
            })
        };

        let started = std::time::Instant::now();
        assert!(book.wait(&id, Duration::from_secs(5)).await);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(!book.is_open(&id));
        replier.await.unwrap();
    }

    #[tokio::test]
    async fn silent_conversation_times_out_unanswered() {
        let book = ConversationBook::new();
        let id = ConversationId::generate();
        book.open(id.clone(), 1);
        assert!(!book.wait(&id, Duration::from_millis(10)).await);
        assert_eq!(book.open_count(), 0);
    }

    #[test]
    fn replies_to_unknown_conversations_are_rejected() {
        let book = ConversationBook::new();
        assert!(!book.record_reply(&ConversationId::generate()));
    }

    #[test]
    fn joining_outside_a_runtime_is_an_error() {
        let registry = Arc::new(AgentRegistry::new());
        let handle = RobotHandle::new(stackyard_core::presence::RobotView::new(
            "offline",
            Position::new(0, 0),
        ));
        let err = Negotiator::join("offline", handle, Arc::clone(&registry), NegotiatorSettings::default())
            .unwrap_err();
        assert_eq!(err, StackyardError::NoRuntime("offline".into()));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn lone_agent_gets_no_answers() {
        let registry = Arc::new(AgentRegistry::new());
        let handle = RobotHandle::new(stackyard_core::presence::RobotView::new(
            "solo",
            Position::new(0, 0),
        ));
        let negotiator =
            Negotiator::join("solo", handle, Arc::clone(&registry), NegotiatorSettings::default()).unwrap();
        assert!(!negotiator.query_availability(Position::new(1, 1)).await);
        drop(negotiator);
        assert!(registry.is_empty());
    }
}
