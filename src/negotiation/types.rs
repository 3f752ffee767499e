//! Negotiation types and offer state machine

use crate::types::{MessageId, ParticipantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Side a participant plays in a thread
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Buyer,
    Seller,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Buyer => write!(f, "buyer"),
            Role::Seller => write!(f, "seller"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buyer" => Ok(Role::Buyer),
            "seller" => Ok(Role::Seller),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Offer lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
}

impl OfferStatus {
    /// Check if the offer can no longer change
    pub fn is_terminal(&self) -> bool {
        matches!(self, OfferStatus::Accepted | OfferStatus::Rejected)
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OfferStatus::Pending => write!(f, "pending"),
            OfferStatus::Accepted => write!(f, "accepted"),
            OfferStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Response to a pending offer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    /// Status an offer ends up in after this decision
    pub fn outcome(&self) -> OfferStatus {
        match self {
            Decision::Accept => OfferStatus::Accepted,
            Decision::Reject => OfferStatus::Rejected,
        }
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accept" => Ok(Decision::Accept),
            "reject" | "decline" => Ok(Decision::Reject),
            other => Err(format!("unknown decision: {}", other)),
        }
    }
}

/// Price offer embedded in a message
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub amount: f64,
    pub status: OfferStatus,
}

/// What a message carries
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Offer(Offer),
}

/// An entry in a negotiation thread
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: ParticipantId,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: MessageKind,
}

impl Message {
    pub fn offer(&self) -> Option<&Offer> {
        match &self.kind {
            MessageKind::Offer(offer) => Some(offer),
            MessageKind::Text => None,
        }
    }

    pub fn is_offer(&self) -> bool {
        self.offer().is_some()
    }

    pub fn offer_status(&self) -> Option<OfferStatus> {
        self.offer().map(|o| o.status)
    }
}
