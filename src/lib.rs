//! Loop marketplace negotiation library
//!
//! Buyer/seller chat threads about a product listing, with embedded price
//! offers that the counterparty can accept or reject:
//! - `negotiation`: the thread state machine and an engine owning many threads
//! - `protocol`: JSON command/event envelopes for a presentation layer
//! - `cli`: a terminal front end driving a thread from stdin

pub mod cli;
pub mod config;
pub mod error;
pub mod negotiation;
pub mod protocol;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use error::{MarketError, Result};
pub use negotiation::{
    Decision, Message, MessageKind, NegotiationAction, NegotiationEngine, NegotiationThread,
    Offer, OfferStatus, Role,
};
pub use session::Session;
pub use types::{MessageId, Participant, ParticipantId, ProductId, ProductListing, ThreadId};
