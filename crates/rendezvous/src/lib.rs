//! # Rendezvous
//!
//! Pairs a `listener` and a `client` under a shared key and forwards text
//! between them.
//!
//! ## Lifecycle of a key
//!
//! ```text
//! absent -> occupied(1) -> paired(2) -> occupied(1) -> absent
//! ```
//!
//! A key exists in the [`SessionRegistry`] only while at least one role is
//! attached. Attaching to a role that is already held evicts the previous
//! peer, whose relay loop closes its connection.
//!
//! The [`relay`] loop is written against a `Sink<RelayFrame>` and a
//! `Stream<Item = String>`, so the WebSocket layer only adapts frames.

mod error;
mod notice;
mod registry;
mod relay;
mod role;

pub use error::{RelayError, RelayResult};
pub use notice::Notice;
pub use registry::{
    Attachment, PeerId, PeerSignal, RouteOutcome, SessionRegistry, PEER_QUEUE_CAPACITY,
};
pub use relay::{relay, RelayFrame, RelayParams, RelayRequest};
pub use role::Role;
