//! Core types used throughout loop-market

use blake2::{Blake2b512, Digest};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a marketplace user taking part in a thread
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a product listing
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Thread identifier (derived from the buyer, seller and product)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(pub String);

impl ThreadId {
    /// Derive the thread id for a (buyer, seller, product) triple
    pub fn derive(buyer: &ParticipantId, seller: &ParticipantId, product: &ProductId) -> Self {
        let mut hasher = Blake2b512::new();
        // Length prefixes keep ("ab", "c") and ("a", "bc") apart
        for part in [&buyer.0, &seller.0, &product.0] {
            hasher.update((part.len() as u64).to_be_bytes());
            hasher.update(part.as_bytes());
        }
        let result = hasher.finalize();
        Self(hex::encode(&result[..16])) // Use first 16 bytes
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message identifier, sequential within a thread and rendered as `msg-<n>`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct MessageId(pub u64);

impl MessageId {
    pub const PREFIX: &'static str = "msg-";

    pub fn sequence(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.0)
    }
}

impl FromStr for MessageId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .strip_prefix(Self::PREFIX)
            .and_then(|n| n.parse::<u64>().ok())
            .map(MessageId)
            .ok_or_else(|| format!("not a message id: {}", s))
    }
}

impl From<MessageId> for String {
    fn from(id: MessageId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for MessageId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A user as shown in a chat header
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub online: bool,
}

impl Participant {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ParticipantId::new(id),
            name: name.into(),
            online: true,
        }
    }
}

/// The listing a thread is about
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductListing {
    pub id: ProductId,
    pub title: String,
    pub price: f64,
}

impl ProductListing {
    pub fn new(id: impl Into<String>, title: impl Into<String>, price: f64) -> Self {
        Self {
            id: ProductId::new(id),
            title: title.into(),
            price,
        }
    }
}

/// Format a price with its currency symbol, dropping a zero fraction.
/// Sub-cent amounts keep their full precision instead of rounding to zero.
pub fn format_amount(symbol: &str, amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{}{}", symbol, amount as i64)
    } else if (amount * 100.0).round() / 100.0 == amount {
        format!("{}{:.2}", symbol, amount)
    } else {
        format!("{}{}", symbol, amount)
    }
}
