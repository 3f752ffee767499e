//! Negotiation module: chat threads with embedded price offers

pub mod clock;
pub mod engine;
pub mod thread;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{NegotiationAction, NegotiationEngine, OFFER_ACCEPTED_NOTICE};
pub use thread::{NegotiationThread, ThreadSettings};
pub use types::{Decision, Message, MessageKind, Offer, OfferStatus, Role};
