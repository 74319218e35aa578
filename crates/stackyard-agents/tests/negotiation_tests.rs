//! Availability negotiation tests.

use stackyard_agents::prelude::*;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

fn handle(name: &str) -> RobotHandle {
    RobotHandle::new(RobotView::new(name, Position::new(0, 0)))
}

fn settings(timeout_ms: u64) -> NegotiatorSettings {
    NegotiatorSettings {
        mailbox_capacity: 8,
        timeout: Duration::from_millis(timeout_ms),
    }
}

/// Ask `peer` directly through a probe mailbox and return its raw reply.
async fn ask(registry: &AgentRegistry, peer: &str, at: Position) -> AclMessage {
    let (tx, mut rx) = mpsc::channel(4);
    registry.register("probe", tx, handle("probe")).unwrap();
    let request = AclMessage::request(
        "probe",
        peer,
        Request::Availability(at).to_content(),
        ConversationId::generate(),
    );
    registry.send(request.clone()).unwrap();
    let reply = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("peer should answer")
        .expect("mailbox open");
    registry.deregister("probe");
    assert_eq!(reply.conversation_id, request.conversation_id);
    reply
}

#[tokio::test]
async fn free_box_is_reported_available() {
    let registry = Arc::new(AgentRegistry::new());
    let _peer = Negotiator::join("peer", handle("peer"), Arc::clone(&registry), settings(100)).unwrap();

    let reply = ask(&registry, "peer", Position::new(3, 3)).await;
    assert_eq!(reply.performative, Performative::Inform);
    assert_eq!(Availability::parse(&reply.content), Some(Availability::Available));
}

#[tokio::test]
async fn targeted_box_is_reported_unavailable() {
    let registry = Arc::new(AgentRegistry::new());
    let peer_handle = handle("peer");
    peer_handle.update(|v| v.target = Some(Position::new(3, 3)));
    let _peer = Negotiator::join("peer", peer_handle, Arc::clone(&registry), settings(100)).unwrap();

    let reply = ask(&registry, "peer", Position::new(3, 3)).await;
    assert_eq!(Availability::parse(&reply.content), Some(Availability::Unavailable));

    let other = ask(&registry, "peer", Position::new(4, 3)).await;
    assert_eq!(Availability::parse(&other.content), Some(Availability::Available));
}

#[tokio::test]
async fn carried_box_is_reported_unavailable() {
    let registry = Arc::new(AgentRegistry::new());
    let peer_handle = handle("peer");
    peer_handle.update(|v| {
        v.carrying = true;
        v.carried_from = Some(Position::new(1, 2));
    });
    let _peer = Negotiator::join("peer", peer_handle, Arc::clone(&registry), settings(100)).unwrap();

    let reply = ask(&registry, "peer", Position::new(1, 2)).await;
    assert_eq!(reply.content, "NO");
}

#[tokio::test]
async fn query_with_responsive_peers_is_answered() {
    let registry = Arc::new(AgentRegistry::new());
    let asker = Negotiator::join("a", handle("a"), Arc::clone(&registry), settings(100)).unwrap();
    let _b = Negotiator::join("b", handle("b"), Arc::clone(&registry), settings(100)).unwrap();
    let _c = Negotiator::join("c", handle("c"), Arc::clone(&registry), settings(100)).unwrap();

    assert!(asker.query_availability(Position::new(2, 2)).await);
    assert_eq!(asker.book().open_count(), 0);
}

/// A peer answering NO still marks the conversation answered, so the
/// asker treats the box as available. Kept deliberately; the reply payload
/// is never inspected.
#[tokio::test]
async fn no_reply_still_counts_as_answered() {
    let registry = Arc::new(AgentRegistry::new());
    let asker = Negotiator::join("a", handle("a"), Arc::clone(&registry), settings(100)).unwrap();
    let owner = handle("b");
    owner.update(|v| v.target = Some(Position::new(2, 2)));
    let _b = Negotiator::join("b", owner, Arc::clone(&registry), settings(100)).unwrap();

    assert!(asker.query_availability(Position::new(2, 2)).await);
}

#[tokio::test]
async fn zero_peers_means_unavailable() {
    let registry = Arc::new(AgentRegistry::new());
    let asker = Negotiator::join("a", handle("a"), Arc::clone(&registry), settings(100)).unwrap();

    let started = Instant::now();
    assert!(!asker.query_availability(Position::new(0, 1)).await);
    assert!(started.elapsed() < Duration::from_millis(100));
}

#[tokio::test]
async fn silent_peer_times_out_as_unavailable() {
    let registry = Arc::new(AgentRegistry::new());
    let asker = Negotiator::join("a", handle("a"), Arc::clone(&registry), settings(30)).unwrap();
    // Registered but never reads its mailbox.
    let (tx, _rx) = mpsc::channel(4);
    registry.register("mute", tx, handle("mute")).unwrap();

    let started = Instant::now();
    assert!(!asker.query_availability(Position::new(1, 1)).await);
    let waited = started.elapsed();
    assert!(waited >= Duration::from_millis(30), "returned after {waited:?}");
    assert!(waited < Duration::from_secs(2), "returned after {waited:?}");
    assert_eq!(asker.book().open_count(), 0);
}

#[tokio::test]
async fn one_reply_is_enough_when_another_peer_is_silent() {
    let registry = Arc::new(AgentRegistry::new());
    let asker = Negotiator::join("a", handle("a"), Arc::clone(&registry), settings(30)).unwrap();
    let _b = Negotiator::join("b", handle("b"), Arc::clone(&registry), settings(30)).unwrap();
    let (tx, _rx) = mpsc::channel(4);
    registry.register("mute", tx, handle("mute")).unwrap();

    assert!(asker.query_availability(Position::new(1, 1)).await);
}

#[tokio::test]
async fn unknown_request_content_gets_no_reply() {
    let registry = Arc::new(AgentRegistry::new());
    let _peer = Negotiator::join("peer", handle("peer"), Arc::clone(&registry), settings(100)).unwrap();
    let (tx, mut rx) = mpsc::channel(4);
    registry.register("probe", tx, handle("probe")).unwrap();

    registry
        .send(AclMessage::request("probe", "peer", "how are you?", ConversationId::generate()))
        .unwrap();
    let reply = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
    assert!(reply.is_err(), "unknown requests are ignored");
}

#[tokio::test]
async fn dropping_a_negotiator_leaves_the_registry() {
    let registry = Arc::new(AgentRegistry::new());
    let a = Negotiator::join("a", handle("a"), Arc::clone(&registry), settings(100)).unwrap();
    assert!(registry.contains("a"));
    assert_eq!(
        Negotiator::join("a", handle("a"), Arc::clone(&registry), settings(100)).unwrap_err(),
        StackyardError::DuplicateAgent("a".into())
    );
    drop(a);
    assert!(!registry.contains("a"));
}
