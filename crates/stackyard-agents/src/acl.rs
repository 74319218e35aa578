//! ACL messages - the envelope robots negotiate with.
//!
//! The protocol has exactly two performatives. A `REQUEST` asks a peer a
//! question, an `INFORM` answers it under the same conversation id. The
//! only question robots ask is whether a box is available:
//!
//! ```text
//! REQUEST  Robot1 -> Robot2  "available? box(3,4)"  conv-1718000000000-…
//! INFORM   Robot2 -> Robot1  "YES"                  conv-1718000000000-…
//! ```

use serde::{Deserialize, Serialize};
use stackyard_core::error::{Result, StackyardError};
use stackyard_core::types::Position;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Content language of every message.
pub const LANGUAGE: &str = "SL";
/// Ontology the message content refers to.
pub const ONTOLOGY: &str = "warehouse-ontology";
/// Interaction protocol name.
pub const PROTOCOL: &str = "fipa-contract-net";

/// Message kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Performative {
    Request,
    Inform,
}

impl fmt::Display for Performative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Performative::Request => f.write_str("REQUEST"),
            Performative::Inform => f.write_str("INFORM"),
        }
    }
}

/// Correlates one broadcast query with its replies. Process-unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    /// A fresh id derived from the wall clock and a random component.
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        Self(format!("conv-{}-{}", millis, Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An addressed protocol message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclMessage {
    pub performative: Performative,
    pub sender: String,
    pub receiver: String,
    pub content: String,
    pub language: String,
    pub ontology: String,
    pub protocol: String,
    pub conversation_id: ConversationId,
}

impl AclMessage {
    pub fn new(
        performative: Performative,
        sender: impl Into<String>,
        receiver: impl Into<String>,
        content: impl Into<String>,
        conversation_id: ConversationId,
    ) -> Self {
        Self {
            performative,
            sender: sender.into(),
            receiver: receiver.into(),
            content: content.into(),
            language: LANGUAGE.to_string(),
            ontology: ONTOLOGY.to_string(),
            protocol: PROTOCOL.to_string(),
            conversation_id,
        }
    }

    pub fn request(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        content: impl Into<String>,
        conversation_id: ConversationId,
    ) -> Self {
        Self::new(Performative::Request, sender, receiver, content, conversation_id)
    }

    /// An `INFORM` back to this message's sender, in the same conversation.
    pub fn reply(&self, content: impl Into<String>) -> Self {
        Self::new(
            Performative::Inform,
            self.receiver.clone(),
            self.sender.clone(),
            content,
            self.conversation_id.clone(),
        )
    }
}

impl fmt::Display for AclMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} \"{}\" [{}]",
            self.performative, self.sender, self.receiver, self.content, self.conversation_id
        )
    }
}

/// Questions a robot can be asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Is the box at this cell free to be claimed?
    Availability(Position),
}

impl Request {
    const AVAILABILITY: &'static str = "available? box";

    pub fn to_content(&self) -> String {
        match self {
            Request::Availability(at) => format!("{}({},{})", Self::AVAILABILITY, at.x, at.y),
        }
    }

    /// Decode request content. `Ok(None)` means the content is not a
    /// request this protocol knows; malformed availability queries are
    /// errors.
    pub fn parse(content: &str) -> Result<Option<Request>> {
        let Some(start) = content.find(Self::AVAILABILITY) else {
            return Ok(None);
        };
        let rest = &content[start + Self::AVAILABILITY.len()..];
        let malformed = || StackyardError::MalformedContent(content.to_string());

        let inner = rest
            .trim()
            .strip_prefix('(')
            .and_then(|r| r.split(')').next())
            .ok_or_else(malformed)?;
        let (x, y) = inner.split_once(',').ok_or_else(malformed)?;
        let x = x.trim().parse::<i32>().map_err(|_| malformed())?;
        let y = y.trim().parse::<i32>().map_err(|_| malformed())?;
        Ok(Some(Request::Availability(Position::new(x, y))))
    }
}

/// Answer to an availability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    Available,
    Unavailable,
}

impl Availability {
    pub fn to_content(&self) -> &'static str {
        match self {
            Availability::Available => "YES",
            Availability::Unavailable => "NO",
        }
    }

    pub fn parse(content: &str) -> Option<Availability> {
        match content.trim() {
            "YES" => Some(Availability::Available),
            "NO" => Some(Availability::Unavailable),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_ids_are_unique() {
        let a = ConversationId::generate();
        let b = ConversationId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("conv-"));
    }

    #[test]
    fn availability_request_content() {
        let content = Request::Availability(Position::new(3, 14)).to_content();
        assert_eq!(content, "available? box(3,14)");
        assert_eq!(
            Request::parse(&content).unwrap(),
            Some(Request::Availability(Position::new(3, 14)))
        );
    }

    #[test]
    fn unknown_request_content_is_not_an_error() {
        assert_eq!(Request::parse("where is the pivot?").unwrap(), None);
    }

    #[test]
    fn malformed_availability_request_is_rejected() {
        for bad in ["available? box", "available? box(1)", "available? box(a,2)", "available? box 1,2"] {
            assert!(
                matches!(Request::parse(bad), Err(StackyardError::MalformedContent(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn reply_swaps_parties_and_keeps_conversation() {
        let conv = ConversationId::generate();
        let req = AclMessage::request("Robot1", "Robot2", "available? box(1,1)", conv.clone());
        let reply = req.reply(Availability::Unavailable.to_content());
        assert_eq!(reply.performative, Performative::Inform);
        assert_eq!(reply.sender, "Robot2");
        assert_eq!(reply.receiver, "Robot1");
        assert_eq!(reply.conversation_id, conv);
        assert_eq!(Availability::parse(&reply.content), Some(Availability::Unavailable));
        assert_eq!(reply.ontology, ONTOLOGY);
    }
}
