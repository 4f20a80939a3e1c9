//! Structured trace events and message identities.
//!
//! A trace is the already-parsed output of a protocol run: one event per log
//! line, in source order. Only `broadcast` and `delivered` events feed the
//! analyses; the gossip-level actions are part of the input contract but are
//! ignored by the indexer.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Stable identifier of a process participating in the broadcast protocol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ActorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identity of a broadcast message: the actor that introduced it plus that
/// actor's sequence number. Immutable once broadcast.
///
/// The textual form is `source:seq`, the same reference syntax traces use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId {
    pub source: ActorId,
    pub seq: u64,
}

impl MessageId {
    pub fn new(source: impl Into<ActorId>, seq: u64) -> Self {
        Self {
            source: source.into(),
            seq,
        }
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.seq)
    }
}

/// A message reference that does not match the `source:seq` syntax.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed message reference {0:?}: expected `source:seq`")]
pub struct ParseMessageIdError(String);

impl FromStr for MessageId {
    type Err = ParseMessageIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseMessageIdError(s.to_owned());
        let (source, seq) = s.rsplit_once(':').ok_or_else(malformed)?;
        if source.is_empty() {
            return Err(malformed());
        }
        let seq = seq.parse().map_err(|_| malformed())?;
        Ok(Self {
            source: ActorId::new(source),
            seq,
        })
    }
}

/// Protocol action recorded by a trace event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The actor introduced a new message.
    Broadcast(MessageId),
    /// The actor locally accepted a message in its total order.
    Delivered(MessageId),
    /// Gossip ball received from a peer.
    ReceivedBall,
    /// Ball contents merged into the actor's received set.
    ReceivedSet,
    /// Events that became deliverable this round.
    DeliverableSet,
}

/// One structured event from a protocol trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    pub actor: ActorId,
    /// Global wall clock at which the line was logged.
    pub global_clock: u64,
    /// The actor's logical round clock.
    pub logical_clock: u64,
    pub action: Action,
}

impl TraceEvent {
    pub fn new(
        actor: impl Into<ActorId>,
        global_clock: u64,
        logical_clock: u64,
        action: Action,
    ) -> Self {
        Self {
            actor: actor.into(),
            global_clock,
            logical_clock,
            action,
        }
    }

    /// Create a `broadcast` event.
    pub fn broadcast(
        actor: impl Into<ActorId>,
        global_clock: u64,
        logical_clock: u64,
        message: MessageId,
    ) -> Self {
        Self::new(actor, global_clock, logical_clock, Action::Broadcast(message))
    }

    /// Create a `delivered` event.
    pub fn delivered(
        actor: impl Into<ActorId>,
        global_clock: u64,
        logical_clock: u64,
        message: MessageId,
    ) -> Self {
        Self::new(actor, global_clock, logical_clock, Action::Delivered(message))
    }
}
